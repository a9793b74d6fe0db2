//! DynamoTableStore - DynamoDB table を TableStore として使う
//!
//! ## Table Schema
//! ```text
//! Partition Key: id (String)
//! Attributes:
//!   - owner, label, description: String
//!   - dynamic attributes from otherAttributes, typed by their JSON value
//! ```
//!
//! JSON ⇄ AttributeValue: string→S, number→N, bool→BOOL, null→NULL,
//! array→L, object→M.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use tracing::{instrument, warn};
use widget_core::domain::TransportError;
use widget_core::ports::{Item, TableStore, UpdateExpression};

const KEY_ATTRIBUTE: &str = "id";

#[derive(Clone)]
pub struct DynamoTableStore {
    client: Client,
    table: String,
}

impl DynamoTableStore {
    pub fn new(config: &SdkConfig, table: impl Into<String>) -> Self {
        Self::from_client(Client::new(config), table)
    }

    pub fn from_client(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    fn key(id: &str) -> AttributeValue {
        AttributeValue::S(id.to_string())
    }
}

pub fn to_attribute_value(value: &Value) -> AttributeValue {
    match value {
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Null => AttributeValue::Null(true),
        Value::Array(values) => AttributeValue::L(values.iter().map(to_attribute_value).collect()),
        Value::Object(fields) => AttributeValue::M(
            fields
                .iter()
                .map(|(name, value)| (name.clone(), to_attribute_value(value)))
                .collect(),
        ),
    }
}

/// `None` for binary attributes, which widgets never carry.
pub fn from_attribute_value(value: &AttributeValue) -> Option<Value> {
    let converted = match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => match n.parse::<Number>() {
            Ok(number) => Value::Number(number),
            Err(_) => Value::String(n.clone()),
        },
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(values) => {
            Value::Array(values.iter().filter_map(from_attribute_value).collect())
        }
        AttributeValue::M(fields) => Value::Object(
            fields
                .iter()
                .filter_map(|(name, value)| Some((name.clone(), from_attribute_value(value)?)))
                .collect::<Map<String, Value>>(),
        ),
        AttributeValue::Ss(values) => {
            Value::Array(values.iter().cloned().map(Value::String).collect())
        }
        _ => return None,
    };
    Some(converted)
}

fn to_dynamo_item(item: &Item) -> HashMap<String, AttributeValue> {
    item.iter()
        .map(|(name, value)| (name.clone(), to_attribute_value(value)))
        .collect()
}

fn from_dynamo_item(item: &HashMap<String, AttributeValue>) -> Item {
    let mut out = Item::new();
    for (name, value) in item {
        match from_attribute_value(value) {
            Some(value) => {
                out.insert(name.clone(), value);
            }
            None => warn!(attribute = %name, "skipping attribute with unsupported type"),
        }
    }
    out
}

#[async_trait]
impl TableStore for DynamoTableStore {
    fn table(&self) -> &str {
        &self.table
    }

    #[instrument(skip(self, item), fields(table = %self.table))]
    async fn put_item(&self, item: Item) -> Result<(), TransportError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(to_dynamo_item(&item)))
            .send()
            .await
            .map(|_| ())
            .map_err(|error| TransportError::new("put_item", DisplayErrorContext(&error).to_string()))
    }

    #[instrument(skip(self, update), fields(table = %self.table, expression = %update.expression()))]
    async fn update_item(
        &self,
        id: &str,
        update: &UpdateExpression,
    ) -> Result<(), TransportError> {
        let names: HashMap<String, String> = update.attribute_names().into_iter().collect();
        let values: HashMap<String, AttributeValue> = update
            .attribute_values()
            .iter()
            .map(|(token, value)| (token.clone(), to_attribute_value(value)))
            .collect();

        self.client
            .update_item()
            .table_name(&self.table)
            .key(KEY_ATTRIBUTE, Self::key(id))
            .update_expression(update.expression())
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .send()
            .await
            .map(|_| ())
            .map_err(|error| {
                TransportError::new("update_item", DisplayErrorContext(&error).to_string())
            })
    }

    #[instrument(skip(self), fields(table = %self.table))]
    async fn delete_item(&self, id: &str) -> Result<(), TransportError> {
        // 存在しない item の delete_item も成功扱い
        self.client
            .delete_item()
            .table_name(&self.table)
            .key(KEY_ATTRIBUTE, Self::key(id))
            .send()
            .await
            .map(|_| ())
            .map_err(|error| {
                TransportError::new("delete_item", DisplayErrorContext(&error).to_string())
            })
    }

    #[instrument(skip(self), fields(table = %self.table))]
    async fn get_item(&self, id: &str) -> Result<Option<Item>, TransportError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(KEY_ATTRIBUTE, Self::key(id))
            .consistent_read(true)
            .send()
            .await
            .map_err(|error| TransportError::new("get_item", DisplayErrorContext(&error).to_string()))?;

        Ok(output.item().map(from_dynamo_item))
    }
}
