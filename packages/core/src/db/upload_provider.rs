//! UploadProvider Trait - Media Library Abstraction

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// File payload handed to the media library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime: String,
    pub size: usize,
    pub buffer: Vec<u8>,
}

/// Descriptive metadata stored alongside an uploaded file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub name: String,
    pub caption: Option<String>,
    pub alternative_text: Option<String>,
}

/// Media library storage operations
#[async_trait]
pub trait UploadProvider: Send + Sync {
    /// Store a file and return the created file record(s)
    async fn upload(&self, file: UploadFile, info: FileInfo) -> Result<Vec<Value>>;

    /// Look up a file record by numeric id
    async fn find_file(&self, id: u64) -> Result<Option<Value>>;

    /// Remove a previously looked-up file record
    async fn remove(&self, file: Value) -> Result<Value>;
}
