//! WorkerBuilder - PollLoop の構築とワイヤリング
//!
//! # Fail-fast 設計
//! - queue と store の両方が揃っていなければ build() は BuildError を返す
//! - backend の選択は起動時に一度だけ（Dispatcher は WidgetStore trait のみに依存）

use std::sync::Arc;

use super::config::PollSettings;
use super::dispatcher::Dispatcher;
use super::poll_loop::PollLoop;
use crate::ports::{WidgetStore, WorkQueue};

/// # 使用例
/// ```ignore
/// let poll_loop = WorkerBuilder::new()
///     .queue(Arc::new(BucketWorkQueue::new(queue_bucket)))
///     .store(Arc::new(TableStoreBackend::new(table)))
///     .settings(config.poll_settings())
///     .build()?;
/// ```
pub struct WorkerBuilder {
    queue: Option<Arc<dyn WorkQueue>>,
    store: Option<Arc<dyn WidgetStore>>,
    settings: PollSettings,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no work queue configured")]
    MissingQueue,

    #[error("no widget store configured")]
    MissingStore,
}

impl WorkerBuilder {
    pub fn new() -> Self {
        Self {
            queue: None,
            store: None,
            settings: PollSettings::default(),
        }
    }

    pub fn queue(mut self, queue: Arc<dyn WorkQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn store(mut self, store: Arc<dyn WidgetStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn settings(mut self, settings: PollSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> Result<PollLoop, BuildError> {
        let queue = self.queue.ok_or(BuildError::MissingQueue)?;
        let store = self.store.ok_or(BuildError::MissingStore)?;
        Ok(PollLoop::new(queue, Dispatcher::new(store), self.settings))
    }
}

impl Default for WorkerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
