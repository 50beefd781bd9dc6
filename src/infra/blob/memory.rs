use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use time::OffsetDateTime;

use crate::application::blob::{BlobStore, BlobStoreError, StoredObject};

/// In-process blob store for tests and local experiments.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    objects: DashMap<String, StoredObject>,
    puts: AtomicUsize,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `put` calls received so far.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn object(&self, key: &str) -> Option<Bytes> {
        self.objects.get(key).map(|entry| entry.bytes.clone())
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, value: Bytes) -> Result<(), BlobStoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.objects.insert(
            key.to_string(),
            StoredObject {
                bytes: value,
                last_modified: Some(OffsetDateTime::now_utc()),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<StoredObject, BlobStoreError> {
        self.objects
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BlobStoreError::not_found(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_overwrites_previous_value() {
        let store = MemoryBlobStore::new();
        store
            .put("a.json", Bytes::from_static(b"1"))
            .await
            .expect("put");
        store
            .put("a.json", Bytes::from_static(b"2"))
            .await
            .expect("put");

        let object = store.get("a.json").await.expect("get");
        assert_eq!(&object.bytes[..], b"2");
        assert_eq!(store.put_count(), 2);
        assert_eq!(store.keys(), vec!["a.json".to_string()]);
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let store = MemoryBlobStore::new();
        assert!(matches!(
            store.get("nope.json").await,
            Err(BlobStoreError::NotFound { .. })
        ));
    }
}
