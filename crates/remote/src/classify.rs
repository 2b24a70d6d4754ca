//! Failure classification and message rendering
//!
//! Maps a captured [`TransportFailure`] into a coarse taxonomy used for
//! control flow, plus the single human-readable line that ends up in the
//! end-of-run warning block. A 404 never reaches this module: object
//! absence is [`crate::TransportError::NotFound`] and resolves to a cache
//! miss upstream.

use crate::transport::TransportFailure;

/// Scope label used when the storage transport fails.
pub const STORAGE_SCOPE: &str = "storage";

/// Low-level codes that mean the network itself was unreachable.
const CONNECTIVITY_CODES: [&str; 5] = [
    "ECONNREFUSED",
    "EAI_AGAIN",
    "ENOTFOUND",
    "EPROTO",
    "ECONNABORTED",
];

/// Coarse classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The storage endpoint could not be reached at all
    Connectivity,
    /// The service rejected the credentials (HTTP 401)
    Auth,
    /// The service reported a billing problem (HTTP 402)
    Billing,
    /// Anything else
    Generic,
}

/// Classify a failure and render its user-facing message.
#[must_use]
pub fn classify(failure: &TransportFailure, scope: &str) -> (FailureKind, String) {
    if let Some(code) = failure.code.as_deref() {
        if CONNECTIVITY_CODES.contains(&code) {
            return (
                FailureKind::Connectivity,
                format!("Cannot connect to remote cache (scope: {scope}, code: {code})."),
            );
        }
    }

    if let Some(response) = &failure.response {
        let kind = match response.status {
            401 => Some(FailureKind::Auth),
            402 => Some(FailureKind::Billing),
            _ => None,
        };
        if let Some(kind) = kind {
            let message = response
                .message
                .clone()
                .or_else(|| response.body.clone())
                .unwrap_or_else(|| failure.message.clone());
            return (kind, message);
        }
    }

    let details = failure
        .response
        .as_ref()
        .and_then(|response| response.message.clone().or_else(|| response.body.clone()))
        .map(|text| format!(". {text}"))
        .unwrap_or_default();
    let code = failure.code.as_deref().unwrap_or("unknown");
    (
        FailureKind::Generic,
        format!("{}{details} (code: {code})", failure.message),
    )
}
