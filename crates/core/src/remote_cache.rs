//! Remote cache capability consumed by the task orchestrator

use async_trait::async_trait;
use futures::future::{BoxFuture, Shared};
use std::path::Path;

/// Handle to an in-flight store operation.
///
/// The shared future resolves to `true` when the upload settled
/// successfully. Clones observe the same underlying operation, so the
/// adapter can track one clone for the end-of-run join while the caller
/// keeps another.
pub type StoreFuture = Shared<BoxFuture<'static, bool>>;

/// Capability for retrieving and storing per-task artifact bundles in a
/// remote cache.
///
/// Both operations absorb every failure into `false`; nothing crosses this
/// boundary as an error. The orchestrator treats `false` from
/// [`retrieve`](RemoteCache::retrieve) as a cache miss and executes the
/// task locally.
#[async_trait]
pub trait RemoteCache: Send + Sync {
    /// Fetch the bundle for `hash` into `cache_directory`.
    ///
    /// Awaited by the caller; a task cannot proceed until its cache check
    /// resolves. Returns `true` only after the bundle is fully unpacked
    /// and the commit marker is written.
    async fn retrieve(&self, hash: &str, cache_directory: &Path) -> bool;

    /// Upload the bundle for `hash` from `cache_directory`.
    ///
    /// Fire-and-forget: the upload runs in the background so the next task
    /// can begin before it completes. Callers must not block on the
    /// returned future inline; the adapter joins every issued store at run
    /// completion.
    fn store(&self, hash: &str, cache_directory: &Path) -> StoreFuture;
}
