//! Error types for bundle packing

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Error type for bundle operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// I/O error while reading or writing a bundle
    #[error("I/O {operation} failed: {}", path.display())]
    #[diagnostic(
        code(stowage::archive::io),
        help("Check file permissions and ensure the path exists")
    )]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error
        path: Box<Path>,
        /// Operation that failed (e.g., "create", "open", "archive")
        operation: String,
    },

    /// The archive stream was malformed or could not be finalized
    #[error("bundle format error: {message}")]
    #[diagnostic(code(stowage::archive::format))]
    Format {
        /// Description of the format problem
        message: String,
    },
}

impl Error {
    /// Create an I/O error with path context
    #[must_use]
    pub fn io(source: std::io::Error, path: impl AsRef<Path>, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: path.as_ref().into(),
            operation: operation.into(),
        }
    }

    /// Create a format error
    #[must_use]
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }
}

/// Result type for bundle operations
pub type Result<T> = std::result::Result<T, Error>;
