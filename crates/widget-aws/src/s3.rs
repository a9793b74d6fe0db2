//! S3ObjectStore - S3 bucket を ObjectStore として使う

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use tracing::{debug, instrument};
use widget_core::domain::TransportError;
use widget_core::ports::ObjectStore;

#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(config: &SdkConfig, bucket: impl Into<String>) -> Self {
        Self::from_client(Client::new(config), bucket)
    }

    /// Path-style addressing, needed by most S3 emulators.
    pub fn path_style(config: &SdkConfig, bucket: impl Into<String>) -> Self {
        let s3_config = aws_sdk_s3::config::Builder::from(config)
            .force_path_style(true)
            .build();
        Self::from_client(Client::from_conf(s3_config), bucket)
    }

    pub fn from_client(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn first_key(&self, prefix: Option<&str>) -> Result<Option<String>, TransportError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .set_prefix(prefix.map(str::to_string))
            .max_keys(1)
            .send()
            .await
            .map_err(|error| {
                TransportError::new("list_objects_v2", DisplayErrorContext(&error).to_string())
            })?;

        let key = output
            .contents()
            .first()
            .and_then(|object| object.key())
            .map(str::to_string);
        if key.is_none() {
            debug!("no objects in bucket");
        }
        Ok(key)
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, TransportError> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(error) => {
                if error
                    .as_service_error()
                    .is_some_and(|service_error| service_error.is_no_such_key())
                {
                    return Ok(None);
                }
                return Err(TransportError::new(
                    "get_object",
                    DisplayErrorContext(&error).to_string(),
                ));
            }
        };

        let body = output
            .body
            .collect()
            .await
            .map_err(|error| TransportError::new("get_object", error.to_string()))?;
        Ok(Some(body.into_bytes().to_vec()))
    }

    #[instrument(skip(self, body), fields(bucket = %self.bucket, size = body.len()))]
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), TransportError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("application/json")
            .body(ByteStream::from(body))
            .send()
            .await
            .map(|_| ())
            .map_err(|error| {
                TransportError::new("put_object", DisplayErrorContext(&error).to_string())
            })
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn delete(&self, key: &str) -> Result<(), TransportError> {
        // S3 の delete_object は存在しない key でも成功する
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map(|_| ())
            .map_err(|error| {
                TransportError::new("delete_object", DisplayErrorContext(&error).to_string())
            })
    }
}
