//! InMemoryObjectStore - 開発用の object store
//!
//! Keys are kept in a `BTreeMap`, so listing order is lexicographic like S3.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::TransportError;
use crate::ports::ObjectStore;

/// Cloning shares the same underlying objects, so a test can keep a handle
/// while the pipeline owns another.
#[derive(Clone)]
pub struct InMemoryObjectStore {
    bucket: String,
    objects: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl InMemoryObjectStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.objects.lock().await.contains_key(key)
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.lock().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn first_key(&self, prefix: Option<&str>) -> Result<Option<String>, TransportError> {
        let objects = self.objects.lock().await;
        let key = match prefix {
            Some(prefix) => objects.keys().find(|key| key.starts_with(prefix)),
            None => objects.keys().next(),
        };
        Ok(key.cloned())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, TransportError> {
        Ok(self.objects.lock().await.get(key).cloned())
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), TransportError> {
        self.objects.lock().await.insert(key.to_string(), body);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), TransportError> {
        self.objects.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_key_follows_lexicographic_order() {
        let store = InMemoryObjectStore::new("queue");
        store.put("requests/b.json", b"b".to_vec()).await.unwrap();
        store.put("requests/a.json", b"a".to_vec()).await.unwrap();
        store.put("other/z.json", b"z".to_vec()).await.unwrap();

        assert_eq!(
            store.first_key(None).await.unwrap().as_deref(),
            Some("other/z.json")
        );
        assert_eq!(
            store.first_key(Some("requests/")).await.unwrap().as_deref(),
            Some("requests/a.json")
        );
        assert_eq!(store.first_key(Some("nope/")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_missing_key_is_ok() {
        let store = InMemoryObjectStore::new("widgets");
        store.delete("missing").await.unwrap();
        store.delete("missing").await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn clones_share_objects() {
        let store = InMemoryObjectStore::new("widgets");
        let handle = store.clone();
        store.put("k", b"v".to_vec()).await.unwrap();
        assert_eq!(handle.get("k").await.unwrap(), Some(b"v".to_vec()));
    }
}
