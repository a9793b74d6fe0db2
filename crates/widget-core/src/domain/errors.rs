//! Errors - パイプラインのエラー分類
//!
//! - [`TransportError`]: queue / store への呼び出し失敗（リトライ対象）
//! - [`DecodeError`]: payload が JSON として読めない
//! - [`SchemaError`]: JSON だが request の形をしていない
//!
//! Backend and dispatch errors wrap [`TransportError`] and live next to the
//! port / component that produces them.

use thiserror::Error;

/// A queue or store call that did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {message}")]
pub struct TransportError {
    operation: &'static str,
    message: String,
}

impl TransportError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }
}

/// Payload bytes are not valid JSON.
#[derive(Debug, Error)]
#[error("request payload is not valid JSON: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// Decoded payload does not have the shape of a widget request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("request payload must be a JSON object")]
    NotAnObject,

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("required field `{0}` is empty")]
    EmptyField(&'static str),

    #[error("unknown request type `{0}` (expected create, update or delete)")]
    UnknownType(String),

    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}
