//! TableStore port - primary key `id` を持つテーブル（DynamoDB / InMemory）

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

use crate::domain::TransportError;

/// Attribute name to value. Always contains `id` when stored.
pub type Item = BTreeMap<String, Value>;

/// A set of `name = value` assignments applied to one item.
///
/// Rendered the DynamoDB way: `SET #owner=:owner, #label=:label` plus the
/// name and value placeholder maps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateExpression {
    assignments: Vec<(String, Value)>,
}

impl UpdateExpression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an assignment. A second `set` for the same name replaces the first.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.assignments.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = value,
            None => self.assignments.push((name, value)),
        }
        self
    }

    pub fn assignments(&self) -> &[(String, Value)] {
        &self.assignments
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn expression(&self) -> String {
        let clauses: Vec<String> = self
            .placeholders()
            .iter()
            .map(|token| format!("#{token}=:{token}"))
            .collect();
        format!("SET {}", clauses.join(", "))
    }

    /// `#token -> attribute name`
    pub fn attribute_names(&self) -> BTreeMap<String, String> {
        self.placeholders()
            .into_iter()
            .zip(&self.assignments)
            .map(|(token, (name, _))| (format!("#{token}"), name.clone()))
            .collect()
    }

    /// `:token -> value`
    pub fn attribute_values(&self) -> BTreeMap<String, Value> {
        self.placeholders()
            .into_iter()
            .zip(&self.assignments)
            .map(|(token, (_, value))| (format!(":{token}"), value.clone()))
            .collect()
    }

    /// Placeholder tokens, one per assignment, in order.
    ///
    /// Plain identifiers are used as-is; anything else (spaces, dots, dashes)
    /// becomes `attrN`, suffixed until unique.
    fn placeholders(&self) -> Vec<String> {
        let mut used = HashSet::new();
        self.assignments
            .iter()
            .enumerate()
            .map(|(index, (name, _))| {
                let plain = !name.is_empty()
                    && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
                let mut token = if plain {
                    name.clone()
                } else {
                    format!("attr{index}")
                };
                while !used.insert(token.clone()) {
                    token.push('_');
                }
                token
            })
            .collect()
    }
}

/// A table addressed by the string primary key `id`.
///
/// `update_item` on a missing item creates it (upsert). Deleting a missing
/// item is not an error.
#[async_trait]
pub trait TableStore: Send + Sync {
    fn table(&self) -> &str;

    /// Replace the whole item.
    async fn put_item(&self, item: Item) -> Result<(), TransportError>;

    async fn update_item(&self, id: &str, update: &UpdateExpression)
    -> Result<(), TransportError>;

    async fn delete_item(&self, id: &str) -> Result<(), TransportError>;

    async fn get_item(&self, id: &str) -> Result<Option<Item>, TransportError>;
}
