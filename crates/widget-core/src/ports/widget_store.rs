//! WidgetStore port - 永続化 backend の capability interface
//!
//! Dispatcher はこの trait だけに依存する。backend の選択は起動時に一度だけ。

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{TransportError, WidgetPatch, WidgetRecord};

/// A backend call that did not persist the change.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to encode widget {widget_id}: {source}")]
    Encode {
        widget_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("stored widget at {location} is unreadable: {source}")]
    Corrupt {
        location: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Create / update / delete of widget records.
///
/// Every operation is idempotent for a given widget id.
#[async_trait]
pub trait WidgetStore: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Upsert, fully replacing whatever was stored before.
    async fn store(&self, record: &WidgetRecord) -> Result<(), BackendError>;

    /// Apply only the supplied fields where the backend can; otherwise
    /// read-modify-write.
    async fn update(&self, patch: &WidgetPatch) -> Result<(), BackendError>;

    /// Removing a missing record succeeds.
    async fn delete(&self, widget_id: &str, owner: &str) -> Result<(), BackendError>;

    async fn fetch(&self, widget_id: &str, owner: &str)
    -> Result<Option<WidgetRecord>, BackendError>;
}
