//! Dispatcher - request type を WidgetStore の呼び出しに対応付ける
//!
//! One-shot routing with no state between requests. The backend is chosen
//! once at startup; the dispatcher only sees the [`WidgetStore`] trait.
//!
//! The operation is a closed enum produced by exact matching in
//! [`crate::app::schema::validate`], so an unrecognized type is rejected
//! (and reported) before it can get here.

use std::sync::Arc;
use thiserror::Error;
use tracing::{Instrument, error, info, info_span};

use crate::domain::{RequestType, WidgetPatch, WidgetRecord, WidgetRequest};
use crate::ports::{BackendError, WidgetStore};

#[derive(Debug, Error)]
#[error("{op} of widget {widget_id} via {backend} failed: {source}")]
pub struct DispatchError {
    pub op: RequestType,
    pub widget_id: String,
    pub backend: &'static str,
    #[source]
    pub source: BackendError,
}

#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn WidgetStore>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn WidgetStore>) -> Self {
        Self { store }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.name()
    }

    /// Route one validated request to the backend.
    ///
    /// Backend failures are logged here and returned; the caller decides
    /// whether the request is acknowledged.
    pub async fn dispatch(&self, request: &WidgetRequest) -> Result<(), DispatchError> {
        let span = info_span!(
            "dispatch",
            request_id = %request.request_id,
            widget_id = %request.widget_id,
            op = %request.request_type,
        );

        async {
            let result = match request.request_type {
                RequestType::Create => self.store.store(&WidgetRecord::from(request)).await,
                RequestType::Update => self.store.update(&WidgetPatch::from(request)).await,
                RequestType::Delete => {
                    self.store
                        .delete(&request.widget_id, &request.owner)
                        .await
                }
            };

            match result {
                Ok(()) => {
                    info!(backend = self.store.name(), "request dispatched");
                    Ok(())
                }
                Err(source) => {
                    let err = DispatchError {
                        op: request.request_type,
                        widget_id: request.widget_id.clone(),
                        backend: self.store.name(),
                        source,
                    };
                    error!(error = %err, "backend call failed");
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }
}
