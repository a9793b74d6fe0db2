//! Impls - port の実装
//!
//! # 含まれる実装
//! - **ObjectStoreBackend / TableStoreBackend**: WidgetStore の 2 つの backend
//! - **BucketWorkQueue**: ObjectStore の bucket を work queue として使う
//! - **InMemoryObjectStore / InMemoryTableStore**: 開発用・テスト用
//!
//! # 本番用実装
//! S3 / DynamoDB の実装は別クレート `widget-aws` に配置します。

pub mod bucket_queue;
pub mod inmem_object;
pub mod inmem_table;
pub mod object_backend;
pub mod table_backend;

// 主要な型を再エクスポート
pub use self::bucket_queue::BucketWorkQueue;
pub use self::inmem_object::InMemoryObjectStore;
pub use self::inmem_table::InMemoryTableStore;
pub use self::object_backend::ObjectStoreBackend;
pub use self::table_backend::TableStoreBackend;
