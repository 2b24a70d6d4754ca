//! Storage configuration for the blob transport

use secrecy::SecretString;

/// Default request timeout; bundle transfers can be large.
pub const DEFAULT_TIMEOUT_SECS: u64 = 3600;

/// Resolved configuration for one blob storage container.
///
/// Credentials are resolved once (see `stowage-credentials`) before this
/// struct is built and never re-resolved mid-run. The token keeps its
/// [`SecretString`] wrapper so it cannot leak through `Debug` output.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage account name
    pub account: String,
    /// Container holding the cache bundles
    pub container: String,
    /// SAS token, leading `?` already stripped
    pub sas_token: SecretString,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl StorageConfig {
    /// Create a configuration with the default timeout.
    #[must_use]
    pub fn new(
        account: impl Into<String>,
        container: impl Into<String>,
        sas_token: SecretString,
    ) -> Self {
        Self {
            account: account.into(),
            container: container.into(),
            sas_token,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Override the per-request timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}
