//! ObjectStoreBackend - widget を `widgets/{owner}/{id}.json` に JSON で保存
//!
//! Object stores have no partial-update primitive, so `update` is a
//! read-modify-write of the object at the derived key. When the owner
//! changes, the derived key changes too and the object under the old
//! owner's key is left where it is.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::domain::{WidgetPatch, WidgetRecord, object_key};
use crate::ports::{BackendError, ObjectStore, WidgetStore};

pub struct ObjectStoreBackend {
    store: Arc<dyn ObjectStore>,
}

impl ObjectStoreBackend {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    async fn write(&self, record: &WidgetRecord) -> Result<(), BackendError> {
        let key = object_key(&record.owner, &record.id);
        let body = serde_json::to_vec(record).map_err(|source| BackendError::Encode {
            widget_id: record.id.clone(),
            source,
        })?;
        self.store.put(&key, body).await?;
        debug!(bucket = %self.store.bucket(), key = %key, "widget object written");
        Ok(())
    }
}

#[async_trait]
impl WidgetStore for ObjectStoreBackend {
    fn name(&self) -> &'static str {
        "object-store"
    }

    async fn store(&self, record: &WidgetRecord) -> Result<(), BackendError> {
        self.write(record).await
    }

    async fn update(&self, patch: &WidgetPatch) -> Result<(), BackendError> {
        let record = match self.fetch(&patch.id, &patch.owner).await? {
            Some(mut existing) => {
                existing.apply(patch);
                existing
            }
            None => patch.to_record(),
        };
        self.write(&record).await
    }

    async fn delete(&self, widget_id: &str, owner: &str) -> Result<(), BackendError> {
        let key = object_key(owner, widget_id);
        self.store.delete(&key).await?;
        debug!(bucket = %self.store.bucket(), key = %key, "widget object deleted");
        Ok(())
    }

    async fn fetch(
        &self,
        widget_id: &str,
        owner: &str,
    ) -> Result<Option<WidgetRecord>, BackendError> {
        let key = object_key(owner, widget_id);
        let Some(body) = self.store.get(&key).await? else {
            return Ok(None);
        };
        let record = serde_json::from_slice(&body)
            .map_err(|source| BackendError::Corrupt { location: key, source })?;
        Ok(Some(record))
    }
}
