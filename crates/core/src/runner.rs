//! External scheduler seam

use crate::RemoteCache;
use async_trait::async_trait;
use std::sync::Arc;

/// The external task scheduler this workspace wraps.
///
/// `T` and `C` are the scheduler's own task and run-context types; the
/// wrapper never inspects them. When remote caching is active the wrapper
/// passes a [`RemoteCache`] for the scheduler to consult during each
/// task's lifecycle; when inactive it passes `None` and the scheduler
/// falls back to purely local caching.
#[async_trait]
pub trait TasksRunner<T, C>: Send + Sync
where
    T: Send + 'static,
    C: Send + 'static,
{
    /// Whatever the scheduler reports at the end of a run; forwarded
    /// downstream unmodified.
    type Outcome: Send;

    /// Execute the task batch.
    async fn run(
        &self,
        tasks: Vec<T>,
        context: C,
        remote_cache: Option<Arc<dyn RemoteCache>>,
    ) -> Self::Outcome;
}
