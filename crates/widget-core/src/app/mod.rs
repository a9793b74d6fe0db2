//! App - アプリケーション層
//!
//! ports を組み合わせてパイプラインを実装します。
//!
//! # 主要コンポーネント
//! - **schema**: decode + validate（副作用なし）
//! - **Dispatcher**: request type → WidgetStore の呼び出し
//! - **PollLoop**: fetch → decode → validate → dispatch → ack
//! - **WorkerBuilder**: 起動時のワイヤリングと検証
//! - **WorkerConfig**: 起動時に一度だけ作る設定

pub mod builder;
pub mod config;
pub mod dispatcher;
pub mod poll_loop;
pub mod schema;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, WorkerBuilder};
pub use self::config::{
    AckPolicy, BackendTarget, ConfigError, DEFAULT_POLL_INTERVAL, PollSettings, StorageKind,
    WorkerConfig,
};
pub use self::dispatcher::{DispatchError, Dispatcher};
pub use self::poll_loop::{Iteration, PollLoop, PollerHandle, RetainReason};
