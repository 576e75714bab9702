use std::path::PathBuf;

use thiserror::Error;

use crate::parser::ParseError;

pub type UnifyResult<T> = Result<T, UnifyError>;

/// Failures of a unification run. Every variant except `GlossaryLoad` ends
/// the run without producing SQL.
#[derive(Debug, Error)]
pub enum UnifyError {
    /// The ticket holds no usable input.
    #[error("ValidationError: {message}")]
    Validation { message: String },

    /// A query could not be split into projection and source clause.
    #[error("ParseError in {source_label}: {error}")]
    Parse {
        source_label: String,
        #[source]
        error: ParseError,
    },

    /// A query uses a construct that cannot be unified (`SELECT *`, several statements).
    #[error("UnsupportedConstructError in {source_label}: {construct}")]
    UnsupportedConstruct { source_label: String, construct: String },

    /// The glossary file exists but could not be read. Renaming is skipped.
    #[error("GlossaryLoadError in {}: {message}", .path.display())]
    GlossaryLoad { path: PathBuf, message: String },

    /// Reading the ticket or publishing the result failed.
    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl UnifyError {
    pub fn validation(message: impl Into<String>) -> Self {
        UnifyError::Validation { message: message.into() }
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        UnifyError::Io { context: context.into(), source }
    }

    /// Stable name of the failure kind, as shown to the ticket author.
    pub fn kind(&self) -> &'static str {
        match self {
            UnifyError::Validation { .. } => "ValidationError",
            UnifyError::Parse { .. } => "ParseError",
            UnifyError::UnsupportedConstruct { .. } => "UnsupportedConstructError",
            UnifyError::GlossaryLoad { .. } => "GlossaryLoadError",
            UnifyError::Io { .. } => "IoError",
        }
    }

    /// The query slot that caused the failure, when there is one.
    pub fn source_label(&self) -> Option<&str> {
        match self {
            UnifyError::Parse { source_label, .. } |
            UnifyError::UnsupportedConstruct { source_label, .. } => Some(source_label),
            _ => None,
        }
    }
}
