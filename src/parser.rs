use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use smallvec::smallvec;
use smallvec::SmallVec;
use tracing::debug;
use tracing::trace;

use crate::error::ErrorKind;
use crate::error::ParseError;
use crate::node::AtRule;
use crate::node::Body;
use crate::node::BodyKind;
use crate::node::Comment;
use crate::node::Declaration;
use crate::node::NodeData;
use crate::node::Parent;
use crate::node::Root;
use crate::node::Rule;
use crate::node::Source;
use crate::options::ParseOptions;
use crate::tokenizer::is_white_space;
use crate::tokenizer::strip_bom;
use crate::tokenizer::Position;
use crate::tokenizer::Token;
use crate::tokenizer::TokenKind;
use crate::tokenizer::Tokenizer;
use crate::tokenizer::C_EXCLAMATION_MARK;

/// At-rules whose block holds declarations rather than nested rules. Any
/// other at-rule is assumed to hold rules.
const DECLARATION_AT_RULES: &[&str] = &[
    "page",
    "font-face",
    "viewport",
    "counter-style",
    "property",
    "font-palette-values",
];

fn with_vendor_prefixed_eq(name: &str, expected: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name == expected
        || matches!(name.strip_prefix("-webkit-"), Some(name) if name == expected)
        || matches!(name.strip_prefix("-moz-"), Some(name) if name == expected)
        || matches!(name.strip_prefix("-ms-"), Some(name) if name == expected)
        || matches!(name.strip_prefix("-o-"), Some(name) if name == expected)
}

pub fn body_kind(at_rule_name: &str) -> BodyKind {
    if DECLARATION_AT_RULES
        .iter()
        .any(|expected| with_vendor_prefixed_eq(at_rule_name, expected))
    {
        BodyKind::Decls
    } else {
        BodyKind::Rules
    }
}

/// Splits a trailing `!important` (any case, optional space after `!`) off a
/// value. Returns the value and the marker, including the space before it.
pub fn split_important(value: &str) -> Option<(&str, &str)> {
    let bang = value.rfind(C_EXCLAMATION_MARK)?;
    let keyword = value[bang + 1..].trim_start_matches(is_white_space);
    if !keyword.eq_ignore_ascii_case("important") {
        return None;
    }
    let end = value[..bang].trim_end_matches(is_white_space).len();
    Some(value.split_at(end))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminator {
    OpenCurly,
    Semicolon,
    CloseCurly,
    Eof,
}

/// An open container and the raw text seen since its last child.
#[derive(Debug)]
struct Scope {
    container: Parent,
    accepts: BodyKind,
    pending: String,
    start: Position,
}

impl Scope {
    fn new(container: Parent, accepts: BodyKind, start: Position) -> Self {
        Self {
            container,
            accepts,
            pending: String::new(),
            start,
        }
    }
}

#[derive(Debug)]
pub struct Parser<'s> {
    input: &'s str,
    css: &'s str,
    tokens: Vec<Token<'s>>,
    strict: bool,
    file: Option<Arc<Path>>,
    root: Root,
    scopes: SmallVec<[Scope; 8]>,
    /// First token of the statement being collected.
    statement: Option<usize>,
    /// The input ends inside a comment that is part of a statement's text.
    open_comment: bool,
}

impl<'s> Parser<'s> {
    pub fn new(input: &'s str, options: &ParseOptions) -> Self {
        let file = options.resolve_file();
        let tokens = Tokenizer::from(input).tokenize();
        trace!(tokens = tokens.len(), "tokenized");
        let open_comment = tokens
            .last()
            .is_some_and(|token| token.kind == TokenKind::Comment && token.unclosed);
        Self {
            input,
            css: strip_bom(input),
            tokens,
            strict: options.strict,
            root: Root::new(file.clone()),
            file,
            scopes: smallvec![Scope::new(Parent::Root, BodyKind::Rules, Position::default())],
            statement: None,
            open_comment,
        }
    }

    pub fn parse(mut self) -> Result<Root, ParseError> {
        debug!(strict = self.strict, len = self.input.len(), "parsing");
        for index in 0..self.tokens.len() {
            let token = self.tokens[index];
            match token.kind {
                TokenKind::Space => {
                    if self.statement.is_none() {
                        self.scope_mut().pending.push_str(token.text);
                    }
                }
                TokenKind::Comment => {
                    self.check_unclosed(&token, ErrorKind::UnclosedComment)?;
                    if self.statement.is_none() {
                        self.comment(&token);
                    }
                }
                TokenKind::String => {
                    self.check_unclosed(&token, ErrorKind::UnclosedQuote)?;
                    self.begin_statement(index)?;
                }
                TokenKind::OpenCurly => self.open_curly(index)?,
                TokenKind::Semicolon => self.semicolon(index)?,
                TokenKind::CloseCurly => {
                    if !self.close_curly(index)? {
                        debug!(nodes = self.root.len(), "parsed");
                        return Ok(self.root);
                    }
                }
                TokenKind::Word | TokenKind::AtWord | TokenKind::Colon | TokenKind::Other => {
                    self.begin_statement(index)?
                }
            }
        }
        self.end_of_input()
    }

    fn scope(&self) -> &Scope {
        // The root scope stays on the stack until the end of input.
        &self.scopes[self.scopes.len() - 1]
    }

    fn scope_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    fn take_pending(&mut self) -> String {
        std::mem::take(&mut self.scope_mut().pending)
    }

    fn close_scope(&mut self) {
        if let Some(scope) = self.scopes.pop() {
            self.root.set_after(scope.container, scope.pending);
        }
    }

    /// Source text covered by tokens `start..end`. A comment left open at the
    /// end of input is closed here.
    fn slice(&self, start: usize, end: usize) -> Cow<'s, str> {
        if start >= end {
            return Cow::Borrowed("");
        }
        let from = self.tokens[start].range.start as usize;
        let to = self.tokens[end - 1].range.end as usize;
        let text = &self.css[from..to];
        if self.open_comment && end == self.tokens.len() {
            Cow::Owned(format!("{text}*/"))
        } else {
            Cow::Borrowed(text)
        }
    }

    /// Drops one trailing space token from `start..end`.
    fn trim_end(&self, start: usize, end: usize) -> usize {
        if end > start && self.tokens[end - 1].kind == TokenKind::Space {
            end - 1
        } else {
            end
        }
    }

    fn source(&self, position: Position) -> Source {
        Source::new(self.file.clone(), position)
    }

    fn error(&self, kind: ErrorKind, position: Position) -> ParseError {
        ParseError::new(kind, position, self.input, self.file.clone())
    }

    fn check_unclosed(&self, token: &Token<'s>, kind: ErrorKind) -> Result<(), ParseError> {
        if !token.unclosed {
            return Ok(());
        }
        if self.strict {
            return Err(self.error(kind, token.start));
        }
        debug!(
            line = token.start.line,
            column = token.start.column,
            %kind,
            "reading to end of input"
        );
        Ok(())
    }

    fn begin_statement(&mut self, index: usize) -> Result<(), ParseError> {
        if self.statement.is_some() {
            return Ok(());
        }
        let token = self.tokens[index];
        if token.kind == TokenKind::AtWord && token.text.len() == 1 {
            return Err(self.error(ErrorKind::AtRuleWithoutName, token.start));
        }
        self.statement = Some(index);
        Ok(())
    }

    fn open_curly(&mut self, index: usize) -> Result<(), ParseError> {
        if self.scope().accepts == BodyKind::Decls {
            return Err(self.error(ErrorKind::UnexpectedOpenBrace, self.tokens[index].start));
        }
        match self.statement.take() {
            Some(start) if self.tokens[start].kind == TokenKind::AtWord => {
                self.at_rule(start, index, Terminator::OpenCurly)
            }
            Some(start) => self.rule(start, index),
            None => self.rule(index, index),
        }
        Ok(())
    }

    fn semicolon(&mut self, index: usize) -> Result<(), ParseError> {
        let Some(start) = self.statement.take() else {
            self.scope_mut().pending.push(';');
            return Ok(());
        };
        let accepts = self.scope().accepts;
        match accepts {
            BodyKind::Decls => self.declaration(start, index, Terminator::Semicolon)?,
            BodyKind::Rules if self.tokens[start].kind == TokenKind::AtWord => {
                self.at_rule(start, index, Terminator::Semicolon)
            }
            BodyKind::Rules => {
                self.stray(start, index)?;
                self.scope_mut().pending.push(';');
            }
        }
        Ok(())
    }

    /// Returns `false` once parsing has stopped at an unmatched `}`.
    fn close_curly(&mut self, index: usize) -> Result<bool, ParseError> {
        let token = self.tokens[index];
        if self.scopes.len() == 1 {
            if self.strict {
                return Err(self.error(ErrorKind::UnexpectedCloseBrace, token.start));
            }
            debug!(
                line = token.start.line,
                column = token.start.column,
                "unexpected }}, keeping the rest as trailing text"
            );
            let mut after = self.take_pending();
            if let Some(start) = self.statement.take() {
                after.push_str(&self.slice(start, index));
            }
            after.push_str(&self.css[token.range.start as usize..]);
            self.root.after = after;
            return Ok(false);
        }
        self.finish_statement(index, Terminator::CloseCurly)?;
        self.close_scope();
        Ok(true)
    }

    fn end_of_input(mut self) -> Result<Root, ParseError> {
        if self.scopes.len() > 1 {
            let start = self.scope().start;
            if self.strict {
                return Err(self.error(ErrorKind::UnclosedBlock, start));
            }
        }
        self.finish_statement(self.tokens.len(), Terminator::Eof)?;
        while self.scopes.len() > 1 {
            let start = self.scope().start;
            debug!(line = start.line, column = start.column, "closing unclosed block");
            self.close_scope();
        }
        self.close_scope();
        debug!(nodes = self.root.len(), "parsed");
        Ok(self.root)
    }

    /// Ends a statement cut short by `}` or the end of input. Trailing
    /// whitespace goes to the container.
    fn finish_statement(&mut self, end: usize, terminator: Terminator) -> Result<(), ParseError> {
        let Some(start) = self.statement.take() else {
            return Ok(());
        };
        let trimmed = self.trim_end(start, end);
        let accepts = self.scope().accepts;
        match accepts {
            BodyKind::Decls => self.declaration(start, trimmed, terminator)?,
            BodyKind::Rules if self.tokens[start].kind == TokenKind::AtWord => {
                self.at_rule(start, trimmed, terminator)
            }
            BodyKind::Rules => self.stray(start, trimmed)?,
        }
        let trailing = self.slice(trimmed, end);
        self.scope_mut().pending.push_str(&trailing);
        Ok(())
    }

    /// Keeps text that forms no node as raw text of the container.
    fn fold(&mut self, start: usize, end: usize) {
        let text = self.slice(start, end);
        let position = self.tokens[start].start;
        debug!(line = position.line, column = position.column, text = %text, "keeping as raw text");
        self.scope_mut().pending.push_str(&text);
    }

    /// Text between rules that is neither a rule nor an at-rule.
    fn stray(&mut self, start: usize, end: usize) -> Result<(), ParseError> {
        if self.strict {
            return Err(self.error(ErrorKind::MissingPropertyValue, self.tokens[start].start));
        }
        self.fold(start, end);
        Ok(())
    }

    fn rule(&mut self, start: usize, end: usize) {
        let position = self.tokens[start].start;
        let selector_end = self.trim_end(start, end);
        let parent = self.scope().container;
        let rule = Rule {
            before: self.take_pending(),
            selector: self.slice(start, selector_end).to_string(),
            between: self.slice(selector_end, end).to_string(),
            decls: Vec::new(),
            after: String::new(),
            semicolon: false,
        };
        let id = self
            .root
            .push(parent, self.source(position), NodeData::Rule(rule));
        self.root.set_semicolon(parent, false);
        self.scopes
            .push(Scope::new(Parent::Node(id), BodyKind::Decls, position));
    }

    fn at_rule(&mut self, start: usize, end: usize, terminator: Terminator) {
        let token = self.tokens[start];
        let name = &token.text[1..];
        let mut params_start = start + 1;
        if params_start < end && self.tokens[params_start].kind == TokenKind::Space {
            params_start += 1;
        }
        let params_end = self.trim_end(params_start, end);
        let body = (terminator == Terminator::OpenCurly).then(|| Body::new(body_kind(name)));
        let accepts = body.as_ref().map(|body| body.kind);
        let parent = self.scope().container;
        let at_rule = AtRule {
            before: self.take_pending(),
            name: name.to_string(),
            after_name: self.slice(start + 1, params_start).to_string(),
            params: self.slice(params_start, params_end).to_string(),
            between: self.slice(params_end, end).to_string(),
            body,
        };
        let id = self
            .root
            .push(parent, self.source(token.start), NodeData::AtRule(at_rule));
        match accepts {
            Some(accepts) => {
                self.root.set_semicolon(parent, false);
                self.scopes
                    .push(Scope::new(Parent::Node(id), accepts, token.start));
            }
            None => self
                .root
                .set_semicolon(parent, terminator == Terminator::Semicolon),
        }
    }

    fn declaration(
        &mut self,
        start: usize,
        end: usize,
        terminator: Terminator,
    ) -> Result<(), ParseError> {
        let Some(colon) = (start..end).find(|&i| self.tokens[i].kind == TokenKind::Colon) else {
            return self.missing_value(start, end, terminator);
        };
        let prop_end = self.trim_end(start, colon);
        let mut value_start = colon + 1;
        if value_start < end && self.tokens[value_start].kind == TokenKind::Space {
            value_start += 1;
        }
        let raw = self.slice(value_start, end);
        let trimmed = raw.trim_end_matches(is_white_space);
        let trailing = &raw[trimmed.len()..];
        let (value, marker, important) = match split_important(trimmed) {
            Some((value, marker)) => (value, marker, true),
            None => (trimmed, "", false),
        };
        let parent = self.scope().container;
        let decl = Declaration {
            before: self.take_pending(),
            prop: self.slice(start, prop_end).to_string(),
            between: self.slice(prop_end, value_start).to_string(),
            value: value.to_string(),
            important,
            after: format!("{marker}{trailing}"),
        };
        let position = self.tokens[start].start;
        self.root
            .push(parent, self.source(position), NodeData::Decl(decl));
        self.root
            .set_semicolon(parent, terminator == Terminator::Semicolon);
        Ok(())
    }

    fn missing_value(
        &mut self,
        start: usize,
        end: usize,
        terminator: Terminator,
    ) -> Result<(), ParseError> {
        let position = self.tokens[start].start;
        let parent = self.scope().container;
        if terminator == Terminator::Eof {
            // The block is being closed for the caller anyway, so keep the
            // property as a declaration with an empty value.
            let decl = Declaration {
                before: self.take_pending(),
                prop: self.slice(start, end).to_string(),
                between: String::new(),
                value: String::new(),
                important: false,
                after: String::new(),
            };
            self.root
                .push(parent, self.source(position), NodeData::Decl(decl));
            self.root.set_semicolon(parent, false);
            return Ok(());
        }
        if self.strict {
            return Err(self.error(ErrorKind::MissingPropertyValue, position));
        }
        self.fold(start, end);
        if terminator == Terminator::Semicolon {
            self.scope_mut().pending.push(';');
            self.root.set_semicolon(parent, true);
        }
        Ok(())
    }

    fn comment(&mut self, token: &Token<'s>) {
        let content = if token.unclosed {
            &token.text[2..]
        } else {
            &token.text[2..token.text.len() - 2]
        };
        let text = content.trim_matches(is_white_space);
        let left = if text.is_empty() {
            content
        } else {
            &content[..content.len() - content.trim_start_matches(is_white_space).len()]
        };
        let right = &content[left.len() + text.len()..];
        let parent = self.scope().container;
        let comment = Comment {
            before: self.take_pending(),
            left: left.to_string(),
            text: text.to_string(),
            right: right.to_string(),
        };
        self.root
            .push(parent, self.source(token.start), NodeData::Comment(comment));
    }
}
