//! WorkerConfig - 起動時に一度だけ構築する設定
//!
//! Missing destination identifiers are the only fatal errors in the worker.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::domain::{REQUEST_PREFIX, WIDGET_PREFIX};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    ObjectStore,
    TableStore,
}

/// When a fetched request is removed from the queue.
///
/// Decode and schema failures never remove the item under either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AckPolicy {
    /// Remove only when the backend call succeeded. A backend failure leaves
    /// the request for a later iteration (at-least-once).
    #[default]
    OnSuccess,

    /// Remove once dispatch returns, whatever the backend said. A backend
    /// failure loses the request (fire-and-forget).
    AfterDispatch,
}

impl fmt::Display for AckPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AckPolicy::OnSuccess => f.write_str("on-success"),
            AckPolicy::AfterDispatch => f.write_str("after-dispatch"),
        }
    }
}

/// Settings the poll loop itself needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Delay after an empty (or failed) fetch.
    pub interval: Duration,
    pub ack_policy: AckPolicy,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            ack_policy: AckPolicy::default(),
        }
    }
}

/// Where widget records go, after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendTarget {
    ObjectStore { bucket: String },
    TableStore { table: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("object-store storage needs a bucket")]
    MissingBucket,

    #[error("table-store storage needs a table")]
    MissingTable,

    #[error("a queue bucket is required")]
    MissingQueueBucket,

    #[error("queue bucket {bucket} is also the widget bucket; set a queue prefix outside `widgets/`")]
    QueueOverlapsWidgets { bucket: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    pub storage: StorageKind,
    pub bucket: Option<String>,
    pub table: Option<String>,
    pub queue_bucket: String,
    pub queue_prefix: Option<String>,
    pub interval: Duration,
    pub ack_policy: AckPolicy,
}

impl WorkerConfig {
    pub fn new(storage: StorageKind, queue_bucket: impl Into<String>) -> Self {
        Self {
            storage,
            bucket: None,
            table: None,
            queue_bucket: queue_bucket.into(),
            queue_prefix: Some(REQUEST_PREFIX.to_string()),
            interval: DEFAULT_POLL_INTERVAL,
            ack_policy: AckPolicy::default(),
        }
    }

    /// Check the storage-specific requirements and resolve the destination.
    pub fn target(&self) -> Result<BackendTarget, ConfigError> {
        if self.queue_bucket.trim().is_empty() {
            return Err(ConfigError::MissingQueueBucket);
        }
        match self.storage {
            StorageKind::ObjectStore => {
                let bucket = non_empty(&self.bucket).ok_or(ConfigError::MissingBucket)?;
                if bucket == self.queue_bucket.trim() && self.queue_overlaps_widgets() {
                    return Err(ConfigError::QueueOverlapsWidgets { bucket });
                }
                Ok(BackendTarget::ObjectStore { bucket })
            }
            StorageKind::TableStore => non_empty(&self.table)
                .map(|table| BackendTarget::TableStore { table })
                .ok_or(ConfigError::MissingTable),
        }
    }

    /// Whether a queue listing could return widget objects.
    fn queue_overlaps_widgets(&self) -> bool {
        match non_empty(&self.queue_prefix) {
            None => true,
            Some(prefix) => prefix.starts_with(WIDGET_PREFIX) || WIDGET_PREFIX.starts_with(&prefix),
        }
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: self.interval,
            ack_policy: self.ack_policy,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
