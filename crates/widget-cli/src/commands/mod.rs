pub mod enqueue;
pub mod run;

use widget_aws::S3ObjectStore;

use crate::args::AwsArgs;

/// S3 store for `bucket`, path-style when a custom endpoint is set.
pub(crate) fn s3_store(
    sdk_config: &aws_config::SdkConfig,
    aws: &AwsArgs,
    bucket: &str,
) -> S3ObjectStore {
    if aws.endpoint_url.is_some() {
        S3ObjectStore::path_style(sdk_config, bucket)
    } else {
        S3ObjectStore::new(sdk_config, bucket)
    }
}
