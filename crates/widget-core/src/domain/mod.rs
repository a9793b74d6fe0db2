//! Domain model (requests, records, storage keys, errors).

pub mod errors;
pub mod key;
pub mod record;
pub mod request;

pub use self::errors::{DecodeError, SchemaError, TransportError};
pub use self::key::{REQUEST_PREFIX, WIDGET_PREFIX, normalize_owner, object_key, request_key};
pub use self::record::{WidgetPatch, WidgetRecord, RESERVED_FIELDS};
pub use self::request::{Attribute, RequestType, WidgetRequest};
