//! Run-scoped error aggregation
//!
//! One reporter lives for the duration of a run. The first cache-layer
//! error and the first API error each land in a write-once slot; later
//! failures are dropped so the user sees one consolidated warning block
//! instead of per-hash spam. A non-empty `cache_error` slot is also the
//! adapter's degraded-mode gate.

use std::sync::OnceLock;

/// Aggregates the first errors seen during a run and renders them once at
/// the end.
#[derive(Debug, Default)]
pub struct MessageReporter {
    cache_error: OnceLock<String>,
    api_error: OnceLock<String>,
    message: OnceLock<String>,
}

impl MessageReporter {
    /// Create an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the first transport/low-level failure; later calls are
    /// ignored.
    pub fn record_cache_error(&self, message: impl Into<String>) {
        let _ = self.cache_error.set(message.into());
    }

    /// Record the first remote-API-reported failure; later calls are
    /// ignored.
    pub fn record_api_error(&self, message: impl Into<String>) {
        let _ = self.api_error.set(message.into());
    }

    /// Set the informational end-of-run message.
    pub fn set_message(&self, message: impl Into<String>) {
        let _ = self.message.set(message.into());
    }

    /// The recorded cache-layer error, if any.
    #[must_use]
    pub fn cache_error(&self) -> Option<&str> {
        self.cache_error.get().map(String::as_str)
    }

    /// The recorded API error, if any.
    #[must_use]
    pub fn api_error(&self) -> Option<&str> {
        self.api_error.get().map(String::as_str)
    }

    /// Whether either error slot is populated.
    #[must_use]
    pub fn any_errors(&self) -> bool {
        self.cache_error().is_some() || self.api_error().is_some()
    }

    /// Render the collected diagnostics. Called once, at the end of the
    /// run, after every pending store has settled.
    pub fn render(&self) {
        if self.any_errors() {
            let mut lines = Vec::new();
            if let Some(error) = self.cache_error() {
                lines.push(format!("  - {error}"));
            }
            if let Some(error) = self.api_error() {
                // Both slots often capture the same rendered message;
                // don't print it twice.
                if self.cache_error() != Some(error) {
                    lines.push(format!("  - {error}"));
                }
            }
            tracing::warn!("Remote cache problems:\n{}", lines.join("\n"));
        }
        if let Some(message) = self.message.get() {
            tracing::info!("{message}");
        }
    }
}
