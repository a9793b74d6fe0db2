//! BucketWorkQueue - object store の bucket を work queue として扱う
//!
//! fetch = list (max 1) + get, ack = delete. The item selected is whatever
//! the listing returns first; there is no FIFO guarantee.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::domain::TransportError;
use crate::ports::{ObjectStore, QueueItem, WorkQueue};

pub struct BucketWorkQueue {
    store: Arc<dyn ObjectStore>,
    prefix: Option<String>,
}

impl BucketWorkQueue {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            prefix: None,
        }
    }

    /// Only consider keys under `prefix`.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

#[async_trait]
impl WorkQueue for BucketWorkQueue {
    async fn fetch(&self) -> Result<Option<QueueItem>, TransportError> {
        let Some(key) = self.store.first_key(self.prefix.as_deref()).await? else {
            debug!(bucket = %self.store.bucket(), "no pending requests");
            return Ok(None);
        };

        // list と get の間に消えた場合は「空」と同じ扱い
        let Some(body) = self.store.get(&key).await? else {
            debug!(bucket = %self.store.bucket(), key = %key, "listed request vanished before get");
            return Ok(None);
        };

        Ok(Some(QueueItem { key, body }))
    }

    async fn ack(&self, item: &QueueItem) -> Result<(), TransportError> {
        self.store.delete(&item.key).await
    }
}
