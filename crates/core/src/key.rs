//! Cache key hygiene

/// Check that a cache key is safe to use as a blob name stem and a local
/// file name stem.
///
/// Keys are content hashes produced by the orchestrator and are treated as
/// untrusted-but-well-formed identifiers: anything that could traverse out
/// of the cache directory is rejected.
#[must_use]
pub fn is_well_formed_key(key: &str) -> bool {
    !key.is_empty() && key != "." && !key.contains(['/', '\\']) && !key.contains("..")
}
