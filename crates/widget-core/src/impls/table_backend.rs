//! TableStoreBackend - primary key `id` の table に widget を保存
//!
//! create は item 全体の置き換え、update は指定された field だけの SET。

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::domain::{WidgetPatch, WidgetRecord};
use crate::ports::{BackendError, Item, TableStore, UpdateExpression, WidgetStore};

pub struct TableStoreBackend {
    store: Arc<dyn TableStore>,
}

impl TableStoreBackend {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }
}

/// Fixed projection plus flattened dynamic attributes.
pub fn record_to_item(record: &WidgetRecord) -> Item {
    let mut item = Item::new();
    for (name, value) in &record.attributes {
        item.insert(name.clone(), value.clone());
    }
    item.insert("id".to_string(), Value::from(record.id.as_str()));
    item.insert("owner".to_string(), Value::from(record.owner.as_str()));
    item.insert("label".to_string(), Value::from(record.label.as_str()));
    item.insert(
        "description".to_string(),
        Value::from(record.description.as_str()),
    );
    item
}

/// `owner` always, then whichever of `label` / `description` / attributes
/// the request carried.
pub fn patch_to_update(patch: &WidgetPatch) -> UpdateExpression {
    let mut update = UpdateExpression::new().set("owner", patch.owner.as_str());
    if let Some(label) = &patch.label {
        update = update.set("label", label.as_str());
    }
    if let Some(description) = &patch.description {
        update = update.set("description", description.as_str());
    }
    for (name, value) in &patch.attributes {
        update = update.set(name.as_str(), value.clone());
    }
    update
}

#[async_trait]
impl WidgetStore for TableStoreBackend {
    fn name(&self) -> &'static str {
        "table-store"
    }

    async fn store(&self, record: &WidgetRecord) -> Result<(), BackendError> {
        self.store.put_item(record_to_item(record)).await?;
        debug!(table = %self.store.table(), widget_id = %record.id, "widget item put");
        Ok(())
    }

    async fn update(&self, patch: &WidgetPatch) -> Result<(), BackendError> {
        let update = patch_to_update(patch);
        self.store.update_item(&patch.id, &update).await?;
        debug!(
            table = %self.store.table(),
            widget_id = %patch.id,
            expression = %update.expression(),
            "widget item updated"
        );
        Ok(())
    }

    async fn delete(&self, widget_id: &str, _owner: &str) -> Result<(), BackendError> {
        self.store.delete_item(widget_id).await?;
        debug!(table = %self.store.table(), widget_id = %widget_id, "widget item deleted");
        Ok(())
    }

    async fn fetch(
        &self,
        widget_id: &str,
        _owner: &str,
    ) -> Result<Option<WidgetRecord>, BackendError> {
        let Some(item) = self.store.get_item(widget_id).await? else {
            return Ok(None);
        };
        let value = Value::Object(item.into_iter().collect());
        let record = serde_json::from_value(value).map_err(|source| BackendError::Corrupt {
            location: format!("{}/{widget_id}", self.store.table()),
            source,
        })?;
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Attribute, RequestType, WidgetRequest};
    use crate::impls::InMemoryTableStore;
    use serde_json::json;

    fn backend() -> (InMemoryTableStore, TableStoreBackend) {
        let table = InMemoryTableStore::new("widgets");
        let backend = TableStoreBackend::new(Arc::new(table.clone()));
        (table, backend)
    }

    #[test]
    fn item_has_fixed_projection() {
        let record = WidgetRecord::new("widget1", "user");
        assert_eq!(
            record_to_item(&record),
            Item::from([
                ("id".to_string(), json!("widget1")),
                ("owner".to_string(), json!("user")),
                ("label".to_string(), json!("")),
                ("description".to_string(), json!("")),
            ])
        );
    }

    #[test]
    fn update_covers_only_supplied_fields() {
        let patch = WidgetPatch::from(
            &WidgetRequest::new(RequestType::Update, "r1", "widget1", "user")
                .with_label("new label"),
        );
        let update = patch_to_update(&patch);
        assert_eq!(update.expression(), "SET #owner=:owner, #label=:label");
    }

    #[tokio::test]
    async fn update_leaves_other_attributes_untouched() {
        let (table, backend) = backend();
        let mut record = WidgetRecord::new("w1", "Someone");
        record.description = "original".to_string();
        record.attributes.insert("color".to_string(), json!("red"));
        backend.store(&record).await.unwrap();

        let patch = WidgetPatch::from(
            &WidgetRequest::new(RequestType::Update, "r2", "w1", "Jane Doe").with_label("New"),
        );
        backend.update(&patch).await.unwrap();

        let item = table.get_item("w1").await.unwrap().unwrap();
        assert_eq!(item["owner"], json!("Jane Doe"));
        assert_eq!(item["label"], json!("New"));
        assert_eq!(item["description"], json!("original"));
        assert_eq!(item["color"], json!("red"));
    }

    #[tokio::test]
    async fn store_then_fetch_round_trips() {
        let (_, backend) = backend();
        let request = WidgetRequest::new(RequestType::Create, "r1", "w1", "user")
            .with_description("desc")
            .with_attribute(Attribute::new("size", 3));
        let record = WidgetRecord::from(&request);

        backend.store(&record).await.unwrap();

        assert_eq!(backend.fetch("w1", "ignored").await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn delete_twice_succeeds() {
        let (table, backend) = backend();
        backend.store(&WidgetRecord::new("widget1", "user")).await.unwrap();

        backend.delete("widget1", "user").await.unwrap();
        backend.delete("widget1", "user").await.unwrap();

        assert!(table.is_empty().await);
    }
}
