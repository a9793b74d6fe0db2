//! WorkQueue port - 取り出し (fetch) と確認応答 (ack)
//!
//! No leasing and no visibility timeout: this worker assumes it is the only
//! consumer. A fetched item stays in the queue until `ack` removes it.

use async_trait::async_trait;

use crate::domain::TransportError;

/// A pending request as stored in the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    pub key: String,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// At most one pending item, `None` when the queue is empty.
    async fn fetch(&self) -> Result<Option<QueueItem>, TransportError>;

    /// Remove the item so it is not fetched again.
    async fn ack(&self, item: &QueueItem) -> Result<(), TransportError>;
}
