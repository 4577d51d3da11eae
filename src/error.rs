use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in smallworld operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Vector dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    WrongDimension { expected: usize, got: usize },

    /// Invalid argument provided (a setting out of range, a label the
    /// snapshot format cannot carry, an empty path).
    #[error("invalid argument for field '{field}': {reason}")]
    InvalidArgument { field: String, reason: String },

    /// I/O error with context.
    #[error("I/O error at {path}: {context} ({source})")]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
        context: String,
    },

    /// Snapshot parse failure.
    #[error("malformed snapshot {path} at line {line}: {message}")]
    MalformedSnapshot {
        path: PathBuf,
        line: u64,
        message: String,
    },

    /// The operation requires a non-empty index.
    #[error("index is empty")]
    EmptyIndex,
}

impl Error {
    /// Create an I/O error with context.
    pub fn io_err(
        path: impl Into<PathBuf>,
        context: impl Into<String>,
    ) -> impl FnOnce(std::io::Error) -> Self {
        move |e: std::io::Error| Error::Io {
            source: e,
            path: path.into(),
            context: context.into(),
        }
    }

    /// Create an invalid argument error.
    pub fn invalid_arg(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed snapshot error for a given line.
    pub fn malformed(path: impl Into<PathBuf>, line: u64, message: impl Into<String>) -> Self {
        Error::MalformedSnapshot {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}

/// Result type alias for smallworld operations.
pub type Result<T> = std::result::Result<T, Error>;
