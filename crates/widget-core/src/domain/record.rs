//! WidgetRecord / WidgetPatch - 永続化される widget の表現

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

use super::request::{Attribute, WidgetRequest};

/// Names owned by the fixed projection. Dynamic attributes may not use them.
pub const RESERVED_FIELDS: [&str; 4] = ["id", "owner", "label", "description"];

/// The persisted widget.
///
/// JSON form is the fixed projection followed by the dynamic attributes,
/// flattened to top-level fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetRecord {
    pub id: String,
    pub owner: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

impl WidgetRecord {
    pub fn new(id: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            owner: owner.into(),
            label: String::new(),
            description: String::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Overwrite the fields the patch carries, keep the rest.
    pub fn apply(&mut self, patch: &WidgetPatch) {
        self.owner = patch.owner.clone();
        if let Some(label) = &patch.label {
            self.label = label.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        for (name, value) in &patch.attributes {
            self.attributes.insert(name.clone(), value.clone());
        }
    }
}

impl From<&WidgetRequest> for WidgetRecord {
    fn from(request: &WidgetRequest) -> Self {
        Self {
            id: request.widget_id.clone(),
            owner: request.owner.clone(),
            label: request.label.clone().unwrap_or_default(),
            description: request.description.clone().unwrap_or_default(),
            attributes: collect_attributes(&request.widget_id, &request.other_attributes),
        }
    }
}

/// Fields supplied by an update request.
///
/// `None` means "not supplied": backends with a partial-update primitive
/// leave those fields untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetPatch {
    pub id: String,
    pub owner: String,
    pub label: Option<String>,
    pub description: Option<String>,
    pub attributes: BTreeMap<String, Value>,
}

impl WidgetPatch {
    /// Full record with defaults for the missing fields.
    pub fn to_record(&self) -> WidgetRecord {
        let mut record = WidgetRecord::new(self.id.clone(), self.owner.clone());
        record.apply(self);
        record
    }
}

impl From<&WidgetRequest> for WidgetPatch {
    fn from(request: &WidgetRequest) -> Self {
        Self {
            id: request.widget_id.clone(),
            owner: request.owner.clone(),
            label: request.label.clone(),
            description: request.description.clone(),
            attributes: collect_attributes(&request.widget_id, &request.other_attributes),
        }
    }
}

/// Later entries with the same name win.
fn collect_attributes(widget_id: &str, attributes: &[Attribute]) -> BTreeMap<String, Value> {
    let mut out = BTreeMap::new();
    for attribute in attributes {
        if RESERVED_FIELDS.contains(&attribute.name.as_str()) {
            warn!(
                widget_id = %widget_id,
                attribute = %attribute.name,
                "ignoring dynamic attribute with a reserved name"
            );
            continue;
        }
        out.insert(attribute.name.clone(), attribute.value.clone());
    }
    out
}
