//! Port describing the object store that holds snapshots.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Debug, Error)]
pub enum BlobStoreError {
    /// The key does not exist, or the provider refused to say whether it does.
    #[error("object `{key}` not found")]
    NotFound { key: String },
    #[error("blob store unavailable: {message}")]
    Unavailable { message: String },
}

impl BlobStoreError {
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub fn unavailable(message: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            message: message.to_string(),
        }
    }
}

/// Bytes read back from the store.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Bytes,
    pub last_modified: Option<OffsetDateTime>,
}

/// Key/value blob storage. Each call is a single round trip; no retries.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: Bytes) -> Result<(), BlobStoreError>;

    async fn get(&self, key: &str) -> Result<StoredObject, BlobStoreError>;
}
