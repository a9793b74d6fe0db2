//! Ports - 抽象化レイヤー
//!
//! 各 trait は外部システム（object store, table store）へのインターフェースを提供し、
//! 実装の詳細を隠蔽します。
//!
//! - 低レベル: [`ObjectStore`], [`TableStore`] (point operations only)
//! - 高レベル: [`WorkQueue`] (fetch / ack), [`WidgetStore`] (store / update / delete)

pub mod object_store;
pub mod table_store;
pub mod widget_store;
pub mod work_queue;

// 主要な trait を再エクスポート
pub use self::object_store::ObjectStore;
pub use self::table_store::{Item, TableStore, UpdateExpression};
pub use self::widget_store::{BackendError, WidgetStore};
pub use self::work_queue::{QueueItem, WorkQueue};
