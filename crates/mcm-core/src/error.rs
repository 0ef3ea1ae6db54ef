//! Error types for the data store.

use std::path::PathBuf;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The declaration, or the bracket opening its literal, is absent.
    #[error("declaration `{name}` not found")]
    NotFound { name: String },

    /// The bracket scan hit end of input before closing the literal.
    #[error("unbalanced literal starting at byte {offset}")]
    UnbalancedLiteral { offset: usize },

    #[error("parse error at byte {offset}: {message}")]
    Parse { offset: usize, message: String },

    /// The literal parsed, but is neither a list nor a map of lists.
    #[error("`{name}` should be {expected}, found {found}")]
    Shape {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid record: {message}")]
    Record { message: String },

    #[error("invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn parse(offset: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            offset,
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the "nothing there yet" case, which callers treat as an empty collection.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
