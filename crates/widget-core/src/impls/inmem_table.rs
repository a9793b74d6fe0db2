//! InMemoryTableStore - 開発用の table store

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::TransportError;
use crate::ports::{Item, TableStore, UpdateExpression};

#[derive(Clone)]
pub struct InMemoryTableStore {
    table: String,
    items: Arc<Mutex<BTreeMap<String, Item>>>,
}

impl InMemoryTableStore {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            items: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }
}

#[async_trait]
impl TableStore for InMemoryTableStore {
    fn table(&self) -> &str {
        &self.table
    }

    async fn put_item(&self, item: Item) -> Result<(), TransportError> {
        let id = match item.get("id") {
            Some(Value::String(id)) => id.clone(),
            _ => return Err(TransportError::new("put_item", "item has no string `id`")),
        };
        self.items.lock().await.insert(id, item);
        Ok(())
    }

    async fn update_item(
        &self,
        id: &str,
        update: &UpdateExpression,
    ) -> Result<(), TransportError> {
        let mut items = self.items.lock().await;
        let item = items
            .entry(id.to_string())
            .or_insert_with(|| Item::from([("id".to_string(), Value::from(id))]));
        for (name, value) in update.assignments() {
            item.insert(name.clone(), value.clone());
        }
        Ok(())
    }

    async fn delete_item(&self, id: &str) -> Result<(), TransportError> {
        self.items.lock().await.remove(id);
        Ok(())
    }

    async fn get_item(&self, id: &str) -> Result<Option<Item>, TransportError> {
        Ok(self.items.lock().await.get(id).cloned())
    }
}
