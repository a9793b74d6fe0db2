//! widget-core
//!
//! Core building blocks for the widget request worker.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（WidgetRequest, WidgetRecord, storage keys, errors）
//! - **ports**: 抽象化レイヤー（ObjectStore, TableStore, WorkQueue, WidgetStore）
//! - **app**: パイプライン（schema, dispatcher, poll_loop, builder, config）
//! - **impls**: 実装（InMemory stores, BucketWorkQueue, object/table backends）
//!
//! AWS-backed port implementations live in the `widget-aws` crate.

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
