//! Blob transport seam and its error types
//!
//! Transport failures are captured as a [`TransportFailure`] at the one
//! point where the call fails, carrying an explicit low-level code and the
//! API response when one was received. The classifier
//! ([`crate::classify`]) turns that into a user-facing message; nothing
//! downstream sniffs error shapes.

use async_trait::async_trait;
use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Structured API response attached to a failed request.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code reported by the storage service
    pub status: u16,
    /// Message parsed from the response payload, when present
    pub message: Option<String>,
    /// Raw response body, when non-empty
    pub body: Option<String>,
}

/// A transport or API failure, built where the call failed.
#[derive(Debug, Clone)]
pub struct TransportFailure {
    /// Low-level code (`ECONNREFUSED`, `EAI_AGAIN`, ...) when the failure
    /// happened below the HTTP layer
    pub code: Option<String>,
    /// Low-level error message
    pub message: String,
    /// The API response, when the request reached the service
    pub response: Option<ApiResponse>,
}

impl TransportFailure {
    /// A purely local failure (filesystem, archive, task join) with no
    /// code and no API response.
    #[must_use]
    pub fn local(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            response: None,
        }
    }
}

/// Error type for blob transport operations
#[derive(Error, Debug, Diagnostic)]
pub enum TransportError {
    /// The object is absent remotely; this drives the cache-miss path and
    /// is never reported as an error
    #[error("remote object not found: {blob}")]
    #[diagnostic(code(stowage::remote::not_found))]
    NotFound {
        /// Name of the missing blob
        blob: String,
    },

    /// The operation failed for any other reason
    #[error("{}", failure.message)]
    #[diagnostic(code(stowage::remote::transport))]
    Failed {
        /// Details captured at the failing call
        failure: TransportFailure,
    },
}

impl TransportError {
    /// Create a not-found error for `blob`
    #[must_use]
    pub fn not_found(blob: impl Into<String>) -> Self {
        Self::NotFound { blob: blob.into() }
    }

    /// Wrap a captured failure
    #[must_use]
    pub fn failed(failure: TransportFailure) -> Self {
        Self::Failed { failure }
    }

    /// Create a purely local failure
    #[must_use]
    pub fn local(message: impl Into<String>) -> Self {
        Self::Failed {
            failure: TransportFailure::local(message),
        }
    }

    /// Whether this is the "object absent" signal
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The captured failure, if this is not a not-found signal
    #[must_use]
    pub fn failure(&self) -> Option<&TransportFailure> {
        match self {
            Self::NotFound { .. } => None,
            Self::Failed { failure } => Some(failure),
        }
    }
}

/// Result type for blob transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Seam to the blob storage service.
///
/// One bundle per cache key, named `<key>.tar.gz`, inside a single
/// configured container. Implementations never delete remote objects.
#[async_trait]
pub trait BlobTransport: Send + Sync {
    /// Check whether `blob` exists remotely.
    async fn exists(&self, blob: &str) -> Result<bool>;

    /// Download `blob` to the local path `dest`.
    ///
    /// Returns [`TransportError::NotFound`] when the object is absent.
    async fn download(&self, blob: &str, dest: &Path) -> Result<()>;

    /// Upload the local file `source` as `blob`.
    ///
    /// Always attempts the upload; the content-addressing assumption makes
    /// overwrites of an existing bundle harmless.
    async fn upload(&self, blob: &str, source: &Path) -> Result<()>;
}
