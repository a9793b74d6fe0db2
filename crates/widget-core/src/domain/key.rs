//! Storage keys.
//!
//! Widget objects live at `widgets/{owner-normalized}/{widget_id}.json`. The
//! same derivation is used by store, update and delete so all three address
//! the same object.

use ulid::Ulid;

pub const WIDGET_PREFIX: &str = "widgets/";
/// Where `request_key` puts requests and where the worker looks by default.
pub const REQUEST_PREFIX: &str = "requests/";

/// Collapse whitespace runs to `-` and lower-case.
///
/// Leading and trailing whitespace is dropped, so `" Jane  Doe "` and
/// `"jane doe"` normalize to the same segment.
pub fn normalize_owner(owner: &str) -> String {
    owner
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

pub fn object_key(owner: &str, widget_id: &str) -> String {
    format!("{WIDGET_PREFIX}{}/{widget_id}.json", normalize_owner(owner))
}

/// Queue key for a newly produced request.
///
/// ULID は時刻順にソートされるので、"first listed" の取り出しがほぼ FIFO になる
/// （保証ではない）。
pub fn request_key() -> String {
    format!("{REQUEST_PREFIX}{}.json", Ulid::new())
}
