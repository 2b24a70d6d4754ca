//! SAS token resolution for stowage
//!
//! The remote cache authenticates to blob storage with a shared-access
//! token. The token is looked up once at startup from an ordered list of
//! sources, first usable value wins:
//!
//! 1. An explicit configuration value passed by the caller.
//! 2. The [`SAS_TOKEN_ENV_VAR`] environment variable. Present-but-empty
//!    counts as "not configured" and resolution continues.
//! 3. A [`SECRETS_FILE_NAME`] key/value file in the working directory.
//!    A missing file is not an error; a present file without a usable
//!    token is.
//!
//! When no source is configured at all, remote caching is simply disabled
//! (`Ok(None)`). When a source was configured but yielded nothing usable,
//! resolution fails loudly with [`CredentialError::MissingCredential`] so
//! a half-configured workspace never silently runs without its cache.
//!
//! A leading `?` on the token (as copied from a storage portal) is
//! stripped. The resolved token is wrapped in [`SecretString`] and never
//! printed.

mod env_file;

pub use env_file::parse_env_file;

use miette::Diagnostic;
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable consulted for the SAS token.
pub const SAS_TOKEN_ENV_VAR: &str = "STOWAGE_CACHE_SAS_TOKEN";

/// Name of the secrets file probed in the working directory.
pub const SECRETS_FILE_NAME: &str = ".env.secrets";

/// Error type for credential resolution
#[derive(Debug, Error, Diagnostic)]
pub enum CredentialError {
    /// A token source was configured but produced no usable value
    #[error("no usable SAS token was found")]
    #[diagnostic(
        code(stowage::credentials::missing),
        help(
            "set {SAS_TOKEN_ENV_VAR}, add it to {SECRETS_FILE_NAME}, or pass sasToken in the runner options"
        )
    )]
    MissingCredential,

    /// The secrets file exists but could not be read
    #[error("failed to read secrets file: {}", path.display())]
    #[diagnostic(code(stowage::credentials::io))]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path to the secrets file
        path: PathBuf,
    },
}

/// Result type for credential resolution
pub type Result<T> = std::result::Result<T, CredentialError>;

/// What probing a single token source produced.
enum SourceOutcome {
    /// The source is not configured at all
    Absent,
    /// The source is configured but holds nothing usable
    Unusable,
    /// A candidate token, not yet normalized
    Token(String),
}

/// Resolve the SAS token using the process working directory for the
/// secrets-file probe.
pub fn resolve_sas_token(explicit: Option<&str>) -> Result<Option<SecretString>> {
    resolve_sas_token_at(explicit, Path::new("."))
}

/// Resolve the SAS token, probing `working_dir` for the secrets file.
///
/// Returns `Ok(None)` when no source is configured (remote caching
/// disabled), `Ok(Some(token))` on success, and
/// [`CredentialError::MissingCredential`] when a source was present but
/// unusable.
pub fn resolve_sas_token_at(
    explicit: Option<&str>,
    working_dir: &Path,
) -> Result<Option<SecretString>> {
    let secrets_path = working_dir.join(SECRETS_FILE_NAME);
    let probes: [(&str, &dyn Fn() -> Result<SourceOutcome>); 3] = [
        ("config", &|| Ok(explicit_source(explicit))),
        ("env", &|| Ok(env_source(SAS_TOKEN_ENV_VAR))),
        ("secrets-file", &|| {
            file_source(&secrets_path, SAS_TOKEN_ENV_VAR)
        }),
    ];

    let mut saw_unusable = false;
    for (source, probe) in probes {
        match probe()? {
            SourceOutcome::Token(raw) => {
                let token = normalize_token(&raw);
                if token.is_empty() {
                    saw_unusable = true;
                    continue;
                }
                tracing::debug!(source, "resolved SAS token");
                return Ok(Some(SecretString::from(token)));
            }
            SourceOutcome::Unusable => saw_unusable = true,
            SourceOutcome::Absent => {}
        }
    }

    if saw_unusable {
        Err(CredentialError::MissingCredential)
    } else {
        tracing::debug!("no SAS token configured; remote caching disabled");
        Ok(None)
    }
}

fn explicit_source(explicit: Option<&str>) -> SourceOutcome {
    match explicit {
        None => SourceOutcome::Absent,
        Some(value) if value.trim().is_empty() => SourceOutcome::Unusable,
        Some(value) => SourceOutcome::Token(value.to_string()),
    }
}

fn env_source(name: &str) -> SourceOutcome {
    match std::env::var(name) {
        // Present-but-empty means "not configured", keep probing.
        Ok(value) if value.trim().is_empty() => SourceOutcome::Absent,
        Ok(value) => SourceOutcome::Token(value),
        Err(std::env::VarError::NotPresent) => SourceOutcome::Absent,
        Err(std::env::VarError::NotUnicode(_)) => SourceOutcome::Unusable,
    }
}

fn file_source(path: &Path, key: &str) -> Result<SourceOutcome> {
    if !path.exists() {
        return Ok(SourceOutcome::Absent);
    }
    let content = std::fs::read_to_string(path).map_err(|source| CredentialError::Io {
        source,
        path: path.to_path_buf(),
    })?;
    let vars = parse_env_file(&content);
    Ok(match vars.get(key) {
        Some(value) if !value.trim().is_empty() => SourceOutcome::Token(value.clone()),
        // File present without a usable token is a loud misconfiguration.
        _ => SourceOutcome::Unusable,
    })
}

/// Strip the `?` query-string prefix a token keeps when copied from a
/// storage portal.
fn normalize_token(raw: &str) -> &str {
    raw.strip_prefix('?').unwrap_or(raw)
}
