//! Catalog loading errors.

use thiserror::Error;

/// Errors raised while loading a schema catalog document
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Catalog file could not be read
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Catalog document is not valid JSON or has the wrong shape
    #[error("Invalid catalog document: {0}")]
    Parse(#[from] serde_json::Error),

    /// Catalog entry key and uid disagree
    #[error("Catalog entry \"{key}\" declares mismatched uid \"{uid}\"")]
    UidMismatch { key: String, uid: String },
}
