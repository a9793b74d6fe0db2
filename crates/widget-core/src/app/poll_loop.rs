//! PollLoop - リクエスト処理ループ
//!
//! # フロー
//! 1. WorkQueue::fetch() で候補を 1 件取得（なければ interval だけ待つ）
//! 2. schema::decode で JSON に変換
//! 3. schema::validate で request の形を検証
//! 4. Dispatcher::dispatch で backend を呼ぶ
//! 5. AckPolicy に従って WorkQueue::ack() で queue から削除
//!
//! Decode and schema failures leave the item in place. Such an item is
//! fetched again on the next iteration until someone removes it out-of-band.
//! An empty queue, a failed fetch, a failed backend call and a failed ack
//! wait `interval` before the next fetch.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::config::{AckPolicy, PollSettings};
use super::dispatcher::Dispatcher;
use super::schema;
use crate::ports::WorkQueue;

/// Why a fetched item was left in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetainReason {
    Decode,
    Schema,
    Backend,
    AckFailed,
}

/// What one pass of the loop did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Iteration {
    /// Queue was empty.
    Idle,
    /// Fetch failed; nothing was inspected.
    FetchFailed,
    /// Item handled and removed.
    Acknowledged { key: String },
    /// Item handled (or not) and kept for a later iteration.
    Retained { key: String, reason: RetainReason },
}

impl Iteration {
    /// Whether the loop should wait before the next fetch.
    ///
    /// Store and ack failures wait too, so an unavailable backend is retried
    /// once per interval. Decode and schema failures do not.
    pub fn should_back_off(&self) -> bool {
        matches!(
            self,
            Iteration::Idle
                | Iteration::FetchFailed
                | Iteration::Retained {
                    reason: RetainReason::Backend | RetainReason::AckFailed,
                    ..
                }
        )
    }
}

pub struct PollLoop {
    queue: Arc<dyn WorkQueue>,
    dispatcher: Dispatcher,
    settings: PollSettings,
}

impl PollLoop {
    pub fn new(queue: Arc<dyn WorkQueue>, dispatcher: Dispatcher, settings: PollSettings) -> Self {
        Self {
            queue,
            dispatcher,
            settings,
        }
    }

    pub fn settings(&self) -> &PollSettings {
        &self.settings
    }

    /// Fetch and process at most one request.
    pub async fn run_once(&self) -> Iteration {
        let item = match self.queue.fetch().await {
            Ok(Some(item)) => item,
            Ok(None) => return Iteration::Idle,
            Err(err) => {
                error!(error = %err, "failed to fetch request");
                return Iteration::FetchFailed;
            }
        };
        let key = item.key.clone();

        let payload = match schema::decode(&item.body) {
            Ok(payload) => payload,
            Err(err) => {
                error!(key = %key, error = %err, "undecodable request left in queue");
                return Iteration::Retained {
                    key,
                    reason: RetainReason::Decode,
                };
            }
        };

        let request = match schema::validate(&payload) {
            Ok(request) => request,
            Err(err) => {
                error!(key = %key, error = %err, "invalid request left in queue");
                return Iteration::Retained {
                    key,
                    reason: RetainReason::Schema,
                };
            }
        };

        // dispatch 失敗時の扱いは AckPolicy で明示的に決める
        let dispatched = self.dispatcher.dispatch(&request).await;
        if dispatched.is_err() && self.settings.ack_policy == AckPolicy::OnSuccess {
            warn!(
                key = %key,
                request_id = %request.request_id,
                "request left in queue for retry"
            );
            return Iteration::Retained {
                key,
                reason: RetainReason::Backend,
            };
        }

        match self.queue.ack(&item).await {
            Ok(()) => {
                info!(key = %key, request_id = %request.request_id, "request acknowledged");
                Iteration::Acknowledged { key }
            }
            Err(err) => {
                // 削除できなかった request は次の iteration で再処理される
                error!(key = %key, error = %err, "failed to acknowledge request");
                Iteration::Retained {
                    key,
                    reason: RetainReason::AckFailed,
                }
            }
        }
    }

    /// Run until `shutdown` turns true or its sender is dropped.
    ///
    /// An in-flight request is always finished before the loop exits.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            backend = self.dispatcher.backend_name(),
            interval_ms = self.settings.interval.as_millis() as u64,
            ack_policy = %self.settings.ack_policy,
            "poll loop started"
        );

        loop {
            // shutdown が来ていたら抜ける
            if *shutdown.borrow() {
                break;
            }

            if !self.run_once().await.should_back_off() {
                continue;
            }

            // idle 待ちは shutdown と競合させる
            let sender_gone = tokio::select! {
                changed = shutdown.changed() => changed.is_err(),
                _ = tokio::time::sleep(self.settings.interval) => false,
            };
            if sender_gone {
                break;
            }
        }

        info!("poll loop stopped");
    }
}

/// Poll loop running on its own task.
/// - `request_shutdown()` でループが次の iteration の前に止まる
/// - `shutdown_and_join()` で終了を待てる
pub struct PollerHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl PollerHandle {
    pub fn spawn(poll_loop: PollLoop) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(async move {
            poll_loop.run(shutdown_rx).await;
        });
        Self { shutdown_tx, join }
    }

    pub fn request_shutdown(&self) {
        // ignore send error: the loop may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) -> Result<(), tokio::task::JoinError> {
        self.request_shutdown();
        self.join.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TransportError, WidgetPatch, WidgetRecord};
    use crate::impls::{BucketWorkQueue, InMemoryObjectStore, InMemoryTableStore, TableStoreBackend};
    use crate::ports::{BackendError, ObjectStore, QueueItem, WidgetStore};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    /// Always empty; remembers when it was asked.
    #[derive(Default)]
    struct EmptyQueue {
        fetched_at: Mutex<Vec<Instant>>,
    }

    #[async_trait]
    impl WorkQueue for EmptyQueue {
        async fn fetch(&self) -> Result<Option<QueueItem>, TransportError> {
            self.fetched_at.lock().unwrap().push(Instant::now());
            Ok(None)
        }

        async fn ack(&self, _item: &QueueItem) -> Result<(), TransportError> {
            unreachable!("nothing to ack")
        }
    }

    struct BrokenQueue;

    #[async_trait]
    impl WorkQueue for BrokenQueue {
        async fn fetch(&self) -> Result<Option<QueueItem>, TransportError> {
            Err(TransportError::new("list_objects", "unreachable endpoint"))
        }

        async fn ack(&self, _item: &QueueItem) -> Result<(), TransportError> {
            Err(TransportError::new("delete_object", "unreachable endpoint"))
        }
    }

    /// Every backend call fails; remembers when each one happened.
    #[derive(Default)]
    struct UnavailableStore {
        called_at: Mutex<Vec<Instant>>,
    }

    impl UnavailableStore {
        fn fail(&self) -> Result<(), BackendError> {
            self.called_at.lock().unwrap().push(Instant::now());
            Err(TransportError::new("put_item", "throttled").into())
        }
    }

    #[async_trait]
    impl WidgetStore for UnavailableStore {
        fn name(&self) -> &'static str {
            "unavailable"
        }

        async fn store(&self, _record: &WidgetRecord) -> Result<(), BackendError> {
            self.fail()
        }

        async fn update(&self, _patch: &WidgetPatch) -> Result<(), BackendError> {
            self.fail()
        }

        async fn delete(&self, _widget_id: &str, _owner: &str) -> Result<(), BackendError> {
            self.fail()
        }

        async fn fetch(
            &self,
            _widget_id: &str,
            _owner: &str,
        ) -> Result<Option<WidgetRecord>, BackendError> {
            Ok(None)
        }
    }

    /// Hands out the same item forever; ack always fails.
    struct UndeletableQueue {
        item: QueueItem,
    }

    #[async_trait]
    impl WorkQueue for UndeletableQueue {
        async fn fetch(&self) -> Result<Option<QueueItem>, TransportError> {
            Ok(Some(self.item.clone()))
        }

        async fn ack(&self, _item: &QueueItem) -> Result<(), TransportError> {
            Err(TransportError::new("delete_object", "access denied"))
        }
    }

    fn create_item() -> QueueItem {
        QueueItem {
            key: "requests/r1.json".to_string(),
            body: br#"{"type":"create","requestId":"r1","widgetId":"w1","owner":"user"}"#
                .to_vec(),
        }
    }

    fn table_dispatcher() -> (InMemoryTableStore, Dispatcher) {
        let table = InMemoryTableStore::new("widgets");
        let dispatcher = Dispatcher::new(Arc::new(TableStoreBackend::new(Arc::new(table.clone()))));
        (table, dispatcher)
    }

    #[tokio::test(start_paused = true)]
    async fn empty_queue_waits_exactly_one_interval_between_fetches() {
        let queue = Arc::new(EmptyQueue::default());
        let (table, dispatcher) = table_dispatcher();
        let settings = PollSettings {
            interval: Duration::from_millis(100),
            ..Default::default()
        };
        let poll_loop = PollLoop::new(queue.clone(), dispatcher, settings);

        let handle = PollerHandle::spawn(poll_loop);
        tokio::time::sleep(Duration::from_millis(350)).await;
        handle.shutdown_and_join().await.unwrap();

        let fetched_at = queue.fetched_at.lock().unwrap().clone();
        assert!(fetched_at.len() >= 3);
        for pair in fetched_at.windows(2) {
            let gap = pair[1] - pair[0];
            // paused clock: timer wheel の 1ms 丸めだけ許容
            assert!(gap >= Duration::from_millis(100) && gap <= Duration::from_millis(101));
        }
        assert!(table.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_backend_is_retried_once_per_interval() {
        let store = Arc::new(UnavailableStore::default());
        let queue = Arc::new(UndeletableQueue {
            item: create_item(),
        });
        let settings = PollSettings {
            interval: Duration::from_millis(100),
            ack_policy: AckPolicy::OnSuccess,
        };
        let poll_loop = PollLoop::new(queue, Dispatcher::new(store.clone()), settings);

        let handle = PollerHandle::spawn(poll_loop);
        tokio::time::sleep(Duration::from_millis(350)).await;
        handle.shutdown_and_join().await.unwrap();

        let called_at = store.called_at.lock().unwrap().clone();
        assert!((3..=5).contains(&called_at.len()), "calls: {}", called_at.len());
        for pair in called_at.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(100));
        }
    }

    #[tokio::test]
    async fn backend_and_ack_failures_back_off() {
        let (_, dispatcher) = table_dispatcher();
        let queue = Arc::new(UndeletableQueue {
            item: create_item(),
        });
        let poll_loop = PollLoop::new(queue, dispatcher, PollSettings::default());

        let iteration = poll_loop.run_once().await;
        assert_eq!(
            iteration,
            Iteration::Retained {
                key: "requests/r1.json".to_string(),
                reason: RetainReason::AckFailed,
            }
        );
        assert!(iteration.should_back_off());

        let backend_failure = Iteration::Retained {
            key: "requests/r1.json".to_string(),
            reason: RetainReason::Backend,
        };
        assert!(backend_failure.should_back_off());
    }

    #[test]
    fn poison_items_do_not_back_off() {
        for reason in [RetainReason::Decode, RetainReason::Schema] {
            let iteration = Iteration::Retained {
                key: "requests/bad.json".to_string(),
                reason,
            };
            assert!(!iteration.should_back_off());
        }
    }

    #[tokio::test]
    async fn fetch_failure_is_reported_not_fatal() {
        let (_, dispatcher) = table_dispatcher();
        let poll_loop = PollLoop::new(Arc::new(BrokenQueue), dispatcher, PollSettings::default());

        let iteration = poll_loop.run_once().await;
        assert_eq!(iteration, Iteration::FetchFailed);
        assert!(iteration.should_back_off());
    }

    #[tokio::test]
    async fn shutdown_stops_idle_loop() {
        let (_, dispatcher) = table_dispatcher();
        let settings = PollSettings {
            interval: Duration::from_secs(3600),
            ..Default::default()
        };
        let poll_loop = PollLoop::new(Arc::new(EmptyQueue::default()), dispatcher, settings);

        let handle = PollerHandle::spawn(poll_loop);
        tokio::time::timeout(Duration::from_secs(5), handle.shutdown_and_join())
            .await
            .expect("loop should stop well before the idle interval")
            .unwrap();
    }

    #[tokio::test]
    async fn dropped_sender_stops_loop() {
        let (_, dispatcher) = table_dispatcher();
        let poll_loop = PollLoop::new(
            Arc::new(EmptyQueue::default()),
            dispatcher,
            PollSettings::default(),
        );
        let (tx, rx) = watch::channel(false);
        drop(tx);

        tokio::time::timeout(Duration::from_secs(5), poll_loop.run(rx))
            .await
            .expect("loop should notice the closed channel");
    }

    #[tokio::test]
    async fn valid_request_is_acknowledged() {
        let bucket = InMemoryObjectStore::new("queue");
        bucket
            .put(
                "requests/r1.json",
                br#"{"type":"delete","requestId":"r1","widgetId":"w1","owner":"user"}"#.to_vec(),
            )
            .await
            .unwrap();
        let (_, dispatcher) = table_dispatcher();
        let queue = Arc::new(BucketWorkQueue::new(Arc::new(bucket.clone())));
        let poll_loop = PollLoop::new(queue, dispatcher, PollSettings::default());

        assert_eq!(
            poll_loop.run_once().await,
            Iteration::Acknowledged {
                key: "requests/r1.json".to_string()
            }
        );
        assert!(bucket.is_empty().await);
        assert_eq!(poll_loop.run_once().await, Iteration::Idle);
    }
}
