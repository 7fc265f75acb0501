use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Default, Clone, Hash, PartialEq, Eq)]
pub struct ParseOptions {
    /// Path of the stylesheet, recorded on every node's source.
    pub from: Option<PathBuf>,
    /// Fail on malformed input instead of fixing it.
    pub strict: bool,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(mut self, path: impl Into<PathBuf>) -> Self {
        self.from = Some(path.into());
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub(crate) fn resolve_file(&self) -> Option<Arc<Path>> {
        let from = self.from.as_deref()?;
        let file = std::path::absolute(from).unwrap_or_else(|_| from.to_path_buf());
        Some(Arc::from(file))
    }
}
