//! Scheduler wrapper for stowage
//!
//! Decides at run start whether remote caching activates, and wires the
//! blob cache adapter into the external scheduler when it does:
//!
//! - A SAS token resolves (config → environment → secrets file) →
//!   construct reporter + transport + adapter, inject the capability,
//!   run the batch, join every pending store, render the diagnostics,
//!   forward the scheduler's outcome.
//! - No token source configured → delegate unmodified; the scheduler
//!   runs with purely local caching and no network calls are made.
//! - A source is present but unusable → the run aborts with
//!   [`CredentialError::MissingCredential`] before any task executes.
//!
//! [`CredentialError::MissingCredential`]: stowage_credentials::CredentialError::MissingCredential

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stowage_core::{RemoteCache, TasksRunner};
use stowage_credentials::resolve_sas_token;
use stowage_remote::{
    AzureBlobTransport, BlobRemoteCache, DEFAULT_TIMEOUT_SECS, MessageReporter, RetrieveStatus,
    StorageConfig,
};
use thiserror::Error;

/// Error type for the runner wrapper
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// Credential resolution failed loudly
    #[error(transparent)]
    #[diagnostic(transparent)]
    Credentials(#[from] stowage_credentials::CredentialError),

    /// The blob transport could not be constructed
    #[error("failed to initialize remote cache transport")]
    #[diagnostic(code(stowage::runner::transport))]
    Transport {
        /// The underlying transport error
        #[source]
        source: stowage_remote::TransportError,
    },
}

/// Result type for the runner wrapper
pub type Result<T> = std::result::Result<T, Error>;

/// Remote cache settings carried in the orchestrator's runner options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCacheOptions {
    /// Storage account name
    pub storage_account: String,
    /// Container holding the cache bundles
    pub storage_container: String,
    /// Explicit SAS token; when absent the environment and the secrets
    /// file are probed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sas_token: Option<String>,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl RemoteCacheOptions {
    /// Options for `account`/`container` with no explicit token.
    #[must_use]
    pub fn new(storage_account: impl Into<String>, storage_container: impl Into<String>) -> Self {
        Self {
            storage_account: storage_account.into(),
            storage_container: storage_container.into(),
            sas_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Run a task batch through `scheduler`, injecting the remote cache
/// capability when credentials resolve.
///
/// Tasks and context are opaque and passed through unmodified. When the
/// scheduler's future resolves, every pending store is joined and the
/// consolidated diagnostics are rendered before the outcome is forwarded.
pub async fn run_tasks<S, T, C>(
    scheduler: &S,
    tasks: Vec<T>,
    context: C,
    options: &RemoteCacheOptions,
) -> Result<S::Outcome>
where
    S: TasksRunner<T, C>,
    T: Send + 'static,
    C: Send + 'static,
{
    let Some(token) = resolve_sas_token(options.sas_token.as_deref())? else {
        tracing::debug!("remote caching inactive; delegating with local caching only");
        return Ok(scheduler.run(tasks, context, None).await);
    };

    let config = StorageConfig::new(&options.storage_account, &options.storage_container, token)
        .with_timeout_secs(options.timeout_secs);
    let transport = AzureBlobTransport::new(config).map_err(|source| Error::Transport { source })?;
    let reporter = Arc::new(MessageReporter::new());
    let adapter = Arc::new(BlobRemoteCache::new(
        Arc::new(transport),
        Arc::clone(&reporter),
    ));

    tracing::debug!(
        account = %options.storage_account,
        container = %options.storage_container,
        "remote caching active"
    );

    let capability: Arc<dyn RemoteCache> = adapter.clone();
    let outcome = scheduler.run(tasks, context, Some(capability)).await;

    // The one mandatory barrier: every issued store settles before the
    // run's diagnostics are rendered and completion moves downstream.
    adapter.wait_for_pending_stores().await;

    let statuses = adapter.statuses();
    let hits = statuses
        .values()
        .filter(|status| **status == RetrieveStatus::RemoteHit)
        .count();
    tracing::debug!(hits, misses = statuses.len() - hits, "remote cache summary");
    reporter.render();

    Ok(outcome)
}
