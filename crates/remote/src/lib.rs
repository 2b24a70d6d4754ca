//! Blob-storage remote cache adapter for stowage
//!
//! This crate implements the [`stowage_core::RemoteCache`] capability on
//! top of SAS-token authenticated blob storage:
//!
//! - [`BlobTransport`] is the seam to the storage service;
//!   [`AzureBlobTransport`] is the HTTP implementation.
//! - [`BlobRemoteCache`] orchestrates existence check → download → unpack
//!   → commit marker on retrieve, and pack → upload on store, tracking
//!   every in-flight store for a single end-of-run join.
//! - [`MessageReporter`] holds the first cache-layer and first API error
//!   seen during a run; once a cache error is recorded the adapter stops
//!   issuing network calls and the build finishes on local caching alone.
//!
//! Failures never cross the capability boundary: both operations degrade
//! to `false` and the consolidated diagnostics are rendered once at the
//! end of the run.

mod adapter;
mod azure;
mod classify;
mod config;
mod report;
mod transport;

pub use adapter::{BlobRemoteCache, RetrieveStatus};
pub use azure::AzureBlobTransport;
pub use classify::{FailureKind, STORAGE_SCOPE, classify};
pub use config::{DEFAULT_TIMEOUT_SECS, StorageConfig};
pub use report::MessageReporter;
pub use transport::{ApiResponse, BlobTransport, TransportError, TransportFailure};
