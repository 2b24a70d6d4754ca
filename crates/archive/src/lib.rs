//! Bundle packing and unpacking for stowage
//!
//! A remote bundle is a gzip-compressed tar of one cache key's output
//! directory. Packing archives `<cache_directory>/<key>` into
//! `<cache_directory>/<key>.tar.gz` with entries rooted at `<key>/`, so
//! unpacking a downloaded bundle into the cache directory recreates the
//! same `<key>` subtree in place.

mod error;

pub use error::{Error, Result};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Remote and local file name for a key's bundle.
#[must_use]
pub fn bundle_file_name(key: &str) -> String {
    format!("{key}.tar.gz")
}

/// Local path of a key's commit marker.
#[must_use]
pub fn commit_marker_path(cache_directory: &Path, key: &str) -> PathBuf {
    cache_directory.join(format!("{key}.commit"))
}

/// Pack `<cache_directory>/<key>` into `<cache_directory>/<key>.tar.gz`.
///
/// Returns the path of the written archive.
pub fn pack_bundle(cache_directory: &Path, key: &str) -> Result<PathBuf> {
    let archive_path = cache_directory.join(bundle_file_name(key));
    let source = cache_directory.join(key);

    let file = File::create(&archive_path).map_err(|e| Error::io(e, &archive_path, "create"))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    builder
        .append_dir_all(key, &source)
        .map_err(|e| Error::io(e, &source, "archive"))?;

    let encoder = builder
        .into_inner()
        .map_err(|e| Error::format(format!("tar finalize failed: {e}")))?;
    encoder
        .finish()
        .map_err(|e| Error::format(format!("gzip finish failed: {e}")))?;

    tracing::trace!(key, archive = %archive_path.display(), "packed bundle");
    Ok(archive_path)
}

/// Unpack a downloaded bundle into the cache directory.
///
/// Entries are extracted relative to `cache_directory`; the tar layer
/// refuses entries that would escape it.
pub fn unpack_bundle(archive_path: &Path, cache_directory: &Path) -> Result<()> {
    let file = File::open(archive_path).map_err(|e| Error::io(e, archive_path, "open"))?;
    let decoder = GzDecoder::new(file);
    let mut archive = tar::Archive::new(decoder);

    archive
        .unpack(cache_directory)
        .map_err(|e| Error::format(format!("bundle extraction failed: {e}")))?;

    tracing::trace!(archive = %archive_path.display(), "unpacked bundle");
    Ok(())
}
