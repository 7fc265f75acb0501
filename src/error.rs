use std::fmt::Display;
use std::path::Path;
use std::sync::Arc;

use crate::tokenizer::Position;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum ErrorKind {
    UnclosedBlock,
    UnexpectedCloseBrace,
    UnclosedComment,
    UnclosedQuote,
    MissingPropertyValue,
    UnexpectedOpenBrace,
    AtRuleWithoutName,
}

impl ErrorKind {
    /// Lenient parsing fixes these instead of failing.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            ErrorKind::UnexpectedOpenBrace | ErrorKind::AtRuleWithoutName
        )
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::UnclosedBlock => write!(f, "Unclosed block"),
            ErrorKind::UnexpectedCloseBrace => write!(f, "Unexpected }}"),
            ErrorKind::UnclosedComment => write!(f, "Unclosed comment"),
            ErrorKind::UnclosedQuote => write!(f, "Unclosed quote"),
            ErrorKind::MissingPropertyValue => write!(f, "Missing property value"),
            ErrorKind::UnexpectedOpenBrace => write!(f, "Unexpected {{"),
            ErrorKind::AtRuleWithoutName => write!(f, "At-rule without name"),
        }
    }
}

/// A fatal parse failure. Carries the whole input so callers can render
/// context around `line:column`.
#[derive(Debug, Clone, Hash, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {line}:{column}")]
pub struct ParseError {
    kind: ErrorKind,
    line: u32,
    column: u32,
    input: String,
    file: Option<Arc<Path>>,
}

impl ParseError {
    pub(crate) fn new(
        kind: ErrorKind,
        position: Position,
        input: &str,
        file: Option<Arc<Path>>,
    ) -> Self {
        Self {
            kind,
            line: position.line,
            column: position.column,
            input: input.to_string(),
            file,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    /// The exact text handed to the parser.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}
