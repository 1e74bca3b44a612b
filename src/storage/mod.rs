//! Storage backend abstraction for uploaded images.
//!
//! Keys are content addressed (`{prefix}/{hash}.{ext}`), so storing the same
//! image twice is a no-op.

pub mod local;

use actix_web::web::Bytes;
use async_trait::async_trait;
use std::sync::Arc;

/// Shared handle placed in app data.
pub type SharedStorage = Arc<dyn StorageBackend>;

/// Represents a retrieved storage object with metadata.
pub struct StorageObject {
    pub body: Bytes,
    /// MIME content type
    pub content_type: Option<String>,
    /// Entity tag for caching
    pub e_tag: Option<String>,
}

/// Storage operation errors.
#[derive(Debug)]
pub enum StorageError {
    /// File not found
    NotFound(String),
    /// I/O error
    Io(std::io::Error),
    /// Key escapes the storage root or is otherwise unusable
    InvalidKey(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::NotFound(msg) => write!(f, "Not found: {}", msg),
            StorageError::Io(e) => write!(f, "I/O error: {}", e),
            StorageError::InvalidKey(msg) => write!(f, "Invalid key: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(e.to_string())
        } else {
            StorageError::Io(e)
        }
    }
}

/// Trait for storage backends.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store a file under `key`.
    async fn put_object(&self, data: Vec<u8>, key: &str) -> Result<(), StorageError>;

    /// Retrieve a file.
    async fn get_object(&self, key: &str) -> Result<StorageObject, StorageError>;

    /// Check if a file exists.
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;
}
