//! HTTP blob transport for SAS-token authenticated storage
//!
//! Talks directly to the blob REST endpoint
//! (`https://<account>.blob.core.windows.net/<container>/<blob>?<sas>`):
//! `HEAD` for existence checks, `GET` for downloads, `PUT` with the
//! block-blob marker header for uploads. The SAS token travels in the
//! query string, so request errors are rendered without their URL.

use crate::config::StorageConfig;
use crate::transport::{ApiResponse, BlobTransport, Result, TransportError, TransportFailure};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::error::Error as _;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Blob transport over the storage service's HTTP interface.
pub struct AzureBlobTransport {
    client: reqwest::Client,
    config: StorageConfig,
}

impl AzureBlobTransport {
    /// Build a transport for the configured container.
    pub fn new(config: StorageConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportError::local(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn blob_url(&self, blob: &str) -> String {
        format!(
            "https://{}.blob.core.windows.net/{}/{}?{}",
            self.config.account,
            self.config.container,
            blob,
            self.config.sas_token.expose_secret()
        )
    }
}

#[async_trait]
impl BlobTransport for AzureBlobTransport {
    async fn exists(&self, blob: &str) -> Result<bool> {
        let response = self
            .client
            .head(self.blob_url(blob))
            .send()
            .await
            .map_err(request_failure)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check_status(response, blob).await.map(|_| true)
    }

    async fn download(&self, blob: &str, dest: &Path) -> Result<()> {
        let response = self
            .client
            .get(self.blob_url(blob))
            .send()
            .await
            .map_err(request_failure)?;
        let mut response = check_status(response, blob).await?;

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| TransportError::local(format!("failed to create {}: {e}", dest.display())))?;
        while let Some(chunk) = response.chunk().await.map_err(request_failure)? {
            file.write_all(&chunk).await.map_err(|e| {
                TransportError::local(format!("failed to write {}: {e}", dest.display()))
            })?;
        }
        file.flush()
            .await
            .map_err(|e| TransportError::local(format!("failed to flush {}: {e}", dest.display())))?;
        Ok(())
    }

    async fn upload(&self, blob: &str, source: &Path) -> Result<()> {
        let bytes = tokio::fs::read(source).await.map_err(|e| {
            TransportError::local(format!("failed to read {}: {e}", source.display()))
        })?;
        let response = self
            .client
            .put(self.blob_url(blob))
            .header("x-ms-blob-type", "BlockBlob")
            .body(bytes)
            .send()
            .await
            .map_err(request_failure)?;
        check_status(response, blob).await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Resolve a response into the not-found signal, a success, or a captured
/// failure carrying the API's status and message.
async fn check_status(response: Response, blob: &str) -> Result<Response> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(TransportError::not_found(blob));
    }
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.message);
    Err(TransportError::failed(TransportFailure {
        code: None,
        message: format!("remote storage request failed with status {status}"),
        response: Some(ApiResponse {
            status: status.as_u16(),
            message,
            body: (!body.is_empty()).then_some(body),
        }),
    }))
}

/// Capture a request error, dropping the URL (it carries the SAS token).
fn request_failure(error: reqwest::Error) -> TransportError {
    let code = connectivity_code(&error);
    let message = error.without_url().to_string();
    TransportError::failed(TransportFailure {
        code,
        message,
        response: None,
    })
}

/// Derive the low-level connectivity code, when the failure happened
/// below the HTTP layer.
fn connectivity_code(error: &reqwest::Error) -> Option<String> {
    let mut source = error.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            let code = match io.kind() {
                std::io::ErrorKind::ConnectionRefused => Some("ECONNREFUSED"),
                std::io::ErrorKind::ConnectionAborted | std::io::ErrorKind::ConnectionReset => {
                    Some("ECONNABORTED")
                }
                _ => None,
            };
            if let Some(code) = code {
                return Some(code.to_string());
            }
        }
        let text = cause.to_string();
        if text.contains("Name or service not known") || text.contains("no addresses") {
            return Some("ENOTFOUND".to_string());
        }
        if text.contains("dns error") || text.contains("failed to lookup address") {
            return Some("EAI_AGAIN".to_string());
        }
        if text.contains("tls") || text.contains("handshake") || text.contains("certificate") {
            return Some("EPROTO".to_string());
        }
        source = cause.source();
    }
    if error.is_connect() {
        return Some("ECONNREFUSED".to_string());
    }
    None
}
