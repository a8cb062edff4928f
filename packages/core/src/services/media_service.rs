//! Media Upload Capability
//!
//! Facade over the media library. Files are fetched over HTTP with
//! `reqwest`, named from caller metadata or the URL path, and handed to the
//! [`UploadProvider`]. The HTTP client is injectable so hosts can impose
//! their own I/O timeouts; this service sets none.

use crate::db::{FileInfo, UploadFile, UploadProvider};
use crate::services::error::GatewayError;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Content type assumed when the remote server sends none
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Filename used when neither metadata nor the URL path supplies one
pub const DEFAULT_FILENAME: &str = "uploaded-file";

/// Caller-supplied descriptive metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaMetadata {
    pub name: Option<String>,
    pub caption: Option<String>,
    pub alternative_text: Option<String>,
}

#[derive(Clone)]
pub struct MediaService {
    provider: Arc<dyn UploadProvider>,
    client: Client,
}

impl MediaService {
    pub fn new(provider: Arc<dyn UploadProvider>) -> Self {
        Self::with_client(provider, Client::new())
    }

    pub fn with_client(provider: Arc<dyn UploadProvider>, client: Client) -> Self {
        Self { provider, client }
    }

    /// Fetch `url` and store the response body in the media library
    pub async fn upload_from_url(
        &self,
        url: &str,
        metadata: MediaMetadata,
    ) -> Result<Vec<Value>, GatewayError> {
        let url = Url::parse(url).map_err(|e| fetch_error(&e))?;
        debug!("Fetching media from {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| fetch_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(
                &status.canonical_reason().unwrap_or(status.as_str()),
            ));
        }

        let mime = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

        let buffer = response.bytes().await.map_err(|e| fetch_error(&e))?.to_vec();

        let filename = non_empty(metadata.name.clone()).unwrap_or_else(|| filename_from_url(&url));

        self.upload_from_buffer(buffer, &filename, &mime, metadata)
            .await
    }

    /// Store raw bytes in the media library
    pub async fn upload_from_buffer(
        &self,
        buffer: Vec<u8>,
        filename: &str,
        mime_type: &str,
        metadata: MediaMetadata,
    ) -> Result<Vec<Value>, GatewayError> {
        let info = FileInfo {
            name: non_empty(metadata.name).unwrap_or_else(|| filename.to_string()),
            caption: non_empty(metadata.caption),
            alternative_text: non_empty(metadata.alternative_text),
        };

        let file = UploadFile {
            name: filename.to_string(),
            mime: mime_type.to_string(),
            size: buffer.len(),
            buffer,
        };

        self.provider
            .upload(file, info)
            .await
            .map_err(GatewayError::upstream)
    }

    pub async fn find_one(&self, id: u64) -> Result<Option<Value>, GatewayError> {
        self.provider
            .find_file(id)
            .await
            .map_err(GatewayError::upstream)
    }

    /// Remove a file by numeric id
    pub async fn delete(&self, id: u64) -> Result<Value, GatewayError> {
        let file = self
            .find_one(id)
            .await?
            .ok_or(GatewayError::MediaNotFound { id })?;

        self.provider
            .remove(file)
            .await
            .map_err(GatewayError::upstream)
    }
}

fn fetch_error(reason: &dyn std::fmt::Display) -> GatewayError {
    GatewayError::Upstream(format!("Failed to fetch image from URL: {}", reason))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

/// Last non-empty path segment of `url`
pub fn filename_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}
