//! Seam traits and shared types for stowage
//!
//! This crate defines the two boundaries the rest of the workspace plugs
//! into:
//! - [`RemoteCache`]: the capability an orchestrator consumes to skip work
//!   whose output already exists remotely. Implemented by
//!   `stowage-remote`.
//! - [`TasksRunner`]: the external scheduler that drives task execution.
//!   The runner wrapper in `stowage-runner` delegates to it, injecting a
//!   [`RemoteCache`] when remote caching is active.
//!
//! Task lists and run contexts are opaque to this workspace: the wrapper
//! passes them through unmodified, and the cache adapter only ever sees
//! cache keys and cache directories.

mod key;
mod remote_cache;
mod runner;

pub use key::is_well_formed_key;
pub use remote_cache::{RemoteCache, StoreFuture};
pub use runner::TasksRunner;
