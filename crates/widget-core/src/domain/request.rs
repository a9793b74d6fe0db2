//! WidgetRequest - queue から読む request

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::SchemaError;

/// Operation a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Create => "create",
            RequestType::Update => "update",
            RequestType::Delete => "delete",
        }
    }

    /// Whole-token match. `"undelete"`, `"Create"` and `"create "` are all rejected.
    pub fn parse(value: &str) -> Result<Self, SchemaError> {
        match value {
            "create" => Ok(RequestType::Create),
            "update" => Ok(RequestType::Update),
            "delete" => Ok(RequestType::Delete),
            other => Err(SchemaError::UnknownType(other.to_string())),
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `{name, value}` entry of `otherAttributes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: serde_json::Value,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A validated widget-mutation request.
///
/// Only [`crate::app::schema::validate`] builds one from untrusted input, so
/// a `WidgetRequest` always has non-empty `request_id`, `widget_id` and `owner`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetRequest {
    #[serde(rename = "type")]
    pub request_type: RequestType,
    pub request_id: String,
    pub widget_id: String,
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub other_attributes: Vec<Attribute>,
}

impl WidgetRequest {
    pub fn new(
        request_type: RequestType,
        request_id: impl Into<String>,
        widget_id: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            request_type,
            request_id: request_id.into(),
            widget_id: widget_id.into(),
            owner: owner.into(),
            label: None,
            description: None,
            other_attributes: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.other_attributes.push(attribute);
        self
    }
}
