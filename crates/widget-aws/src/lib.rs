//! AWS-backed ports for the widget worker.
//!
//! - [`S3ObjectStore`]: `ObjectStore` over one S3 bucket (queue or widget bucket)
//! - [`DynamoTableStore`]: `TableStore` over one DynamoDB table keyed by `id`

pub mod dynamodb;
pub mod s3;

pub use self::dynamodb::DynamoTableStore;
pub use self::s3::S3ObjectStore;

use aws_config::{BehaviorVersion, Region, SdkConfig};

/// Shared SDK configuration.
///
/// `endpoint_url` points both clients at a local emulator (LocalStack,
/// DynamoDB Local).
pub async fn load_sdk_config(region: Option<String>, endpoint_url: Option<String>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(Region::new(region));
    }
    if let Some(endpoint) = endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }
    loader.load().await
}
