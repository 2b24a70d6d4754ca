//! Remote cache adapter
//!
//! Implements the [`RemoteCache`] capability over a [`BlobTransport`].
//! Retrieves are awaited by the caller; stores are spawned so upload
//! latency never serializes the build, with every issued store tracked
//! for the single end-of-run join. After the first non-miss failure the
//! adapter degrades: all further calls return `false` without touching
//! the network, and the build finishes on local caching.

use crate::classify::{STORAGE_SCOPE, classify};
use crate::report::MessageReporter;
use crate::transport::{BlobTransport, TransportError};
use async_trait::async_trait;
use futures::FutureExt;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use stowage_core::{RemoteCache, StoreFuture, is_well_formed_key};

/// Terminal status of one retrieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrieveStatus {
    /// The bundle was downloaded and unpacked
    RemoteHit,
    /// The bundle was absent (or the adapter was degraded)
    RemoteMiss,
}

/// Blob-storage implementation of the remote cache capability.
pub struct BlobRemoteCache {
    transport: Arc<dyn BlobTransport>,
    reporter: Arc<MessageReporter>,
    pending_stores: Mutex<Vec<StoreFuture>>,
    statuses: Mutex<BTreeMap<String, RetrieveStatus>>,
}

impl BlobRemoteCache {
    /// Create an adapter over `transport`, reporting failures to
    /// `reporter`.
    #[must_use]
    pub fn new(transport: Arc<dyn BlobTransport>, reporter: Arc<MessageReporter>) -> Self {
        Self {
            transport,
            reporter,
            pending_stores: Mutex::new(Vec::new()),
            statuses: Mutex::new(BTreeMap::new()),
        }
    }

    /// Fetch the bundle for `hash` into `cache_directory`.
    pub async fn retrieve_bundle(&self, hash: &str, cache_directory: &Path) -> bool {
        if self.reporter.cache_error().is_some() {
            return false;
        }
        if !is_well_formed_key(hash) {
            tracing::warn!(hash, "refusing malformed cache key");
            self.set_status(hash, RetrieveStatus::RemoteMiss);
            return false;
        }

        tracing::debug!(hash, "checking remote cache");
        let blob = stowage_archive::bundle_file_name(hash);

        // Existence-check failures are swallowed: the miss path stays
        // cheap and quiet, and a real outage surfaces on the next
        // download or upload.
        let exists = match self.transport.exists(&blob).await {
            Ok(exists) => exists,
            Err(error) => {
                tracing::debug!(hash, %error, "existence check failed; treating as miss");
                false
            }
        };
        if !exists {
            tracing::debug!(hash, "remote cache miss");
            self.set_status(hash, RetrieveStatus::RemoteMiss);
            return false;
        }

        match self.fetch_and_unpack(hash, &blob, cache_directory).await {
            Ok(()) => {
                tracing::debug!(hash, "remote cache hit");
                self.set_status(hash, RetrieveStatus::RemoteHit);
                true
            }
            Err(error) if error.is_not_found() => {
                // The object vanished between the existence check and the
                // download; an ordinary miss.
                tracing::debug!(hash, "bundle disappeared during download; treating as miss");
                self.set_status(hash, RetrieveStatus::RemoteMiss);
                false
            }
            Err(error) => {
                record_failure(&self.reporter, &error);
                self.set_status(hash, RetrieveStatus::RemoteMiss);
                false
            }
        }
    }

    /// Upload the bundle for `hash` from `cache_directory` in the
    /// background, tracking the operation for the end-of-run join.
    pub fn store_bundle(&self, hash: &str, cache_directory: &Path) -> StoreFuture {
        if self.reporter.cache_error().is_some() {
            return futures::future::ready(false).boxed().shared();
        }
        if !is_well_formed_key(hash) {
            tracing::warn!(hash, "refusing malformed cache key");
            return futures::future::ready(false).boxed().shared();
        }

        let transport = Arc::clone(&self.transport);
        let reporter = Arc::clone(&self.reporter);
        let hash = hash.to_string();
        let cache_directory = cache_directory.to_path_buf();
        let handle = tokio::spawn(async move {
            tracing::debug!(hash = %hash, "storing bundle in remote cache");
            match pack_and_upload(transport.as_ref(), &hash, &cache_directory).await {
                Ok(()) => {
                    tracing::debug!(hash = %hash, "stored bundle");
                    true
                }
                Err(error) => {
                    record_failure(&reporter, &error);
                    false
                }
            }
        });

        let store: StoreFuture = handle.map(|joined| joined.unwrap_or(false)).boxed().shared();
        self.lock_pending().push(store.clone());
        store
    }

    /// Resolve once every previously issued store has settled.
    ///
    /// Returns `true` iff every store succeeded. Safe to call with no
    /// stores issued; all stores must be issued before this final join.
    pub async fn wait_for_pending_stores(&self) -> bool {
        let pending: Vec<StoreFuture> = {
            let mut guard = self.lock_pending();
            guard.drain(..).collect()
        };
        futures::future::join_all(pending)
            .await
            .into_iter()
            .all(|stored| stored)
    }

    /// Per-hash terminal status of every retrieve seen this run.
    #[must_use]
    pub fn statuses(&self) -> BTreeMap<String, RetrieveStatus> {
        self.statuses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_status(&self, hash: &str, status: RetrieveStatus) {
        self.statuses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(hash.to_string(), status);
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Vec<StoreFuture>> {
        self.pending_stores
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    async fn fetch_and_unpack(
        &self,
        hash: &str,
        blob: &str,
        cache_directory: &Path,
    ) -> Result<(), TransportError> {
        let archive_path = cache_directory.join(blob);
        let result = self
            .download_unpack_commit(hash, blob, cache_directory, &archive_path)
            .await;
        if result.is_err() {
            // Never leave a partial archive behind. The commit marker has
            // not been written, so the directory stays safe to regenerate.
            let _ = tokio::fs::remove_file(&archive_path).await;
        }
        result
    }

    async fn download_unpack_commit(
        &self,
        hash: &str,
        blob: &str,
        cache_directory: &Path,
        archive_path: &Path,
    ) -> Result<(), TransportError> {
        self.transport.download(blob, archive_path).await?;

        let archive = archive_path.to_path_buf();
        let directory = cache_directory.to_path_buf();
        tokio::task::spawn_blocking(move || stowage_archive::unpack_bundle(&archive, &directory))
            .await
            .map_err(|e| TransportError::local(format!("unpack task failed: {e}")))?
            .map_err(|e| TransportError::local(e.to_string()))?;

        tokio::fs::write(
            stowage_archive::commit_marker_path(cache_directory, hash),
            "true",
        )
        .await
        .map_err(|e| TransportError::local(format!("failed to write commit marker: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl RemoteCache for BlobRemoteCache {
    async fn retrieve(&self, hash: &str, cache_directory: &Path) -> bool {
        self.retrieve_bundle(hash, cache_directory).await
    }

    fn store(&self, hash: &str, cache_directory: &Path) -> StoreFuture {
        self.store_bundle(hash, cache_directory)
    }
}

async fn pack_and_upload(
    transport: &dyn BlobTransport,
    hash: &str,
    cache_directory: &Path,
) -> Result<(), TransportError> {
    let directory = cache_directory.to_path_buf();
    let key = hash.to_string();
    let archive_path = tokio::task::spawn_blocking(move || {
        stowage_archive::pack_bundle(&directory, &key)
    })
    .await
    .map_err(|e| TransportError::local(format!("pack task failed: {e}")))?
    .map_err(|e| TransportError::local(e.to_string()))?;

    transport
        .upload(&stowage_archive::bundle_file_name(hash), &archive_path)
        .await
}

/// Classify a failure, record it, and mark the API slot when the service
/// itself responded.
fn record_failure(reporter: &MessageReporter, error: &TransportError) {
    let Some(failure) = error.failure() else {
        return;
    };
    let (kind, message) = classify(failure, STORAGE_SCOPE);
    tracing::debug!(kind = ?kind, "remote cache failure: {message}");
    reporter.record_cache_error(message.clone());
    if failure.response.is_some() {
        reporter.record_api_error(message);
    }
}
