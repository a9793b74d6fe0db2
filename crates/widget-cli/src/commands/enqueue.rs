use anyhow::{Context, Result};
use tracing::info;
use widget_core::app::schema;
use widget_core::domain::request_key;
use widget_core::ports::ObjectStore;

use super::s3_store;
use crate::args::EnqueueArgs;

/// Validate first so a malformed file never becomes a poison message.
pub async fn run(args: EnqueueArgs) -> Result<()> {
    let body = std::fs::read(&args.file)
        .with_context(|| format!("read request file {}", args.file.display()))?;
    let payload = schema::decode(&body)?;
    let request = schema::validate(&payload)
        .with_context(|| format!("{} is not a valid widget request", args.file.display()))?;

    let sdk_config =
        widget_aws::load_sdk_config(args.aws.region.clone(), args.aws.endpoint_url.clone()).await;
    let queue = s3_store(&sdk_config, &args.aws, &args.queue_bucket);

    let key = request_key();
    queue.put(&key, body).await?;

    info!(
        key = %key,
        request_id = %request.request_id,
        op = %request.request_type,
        "request enqueued"
    );
    println!("{key}");
    Ok(())
}
