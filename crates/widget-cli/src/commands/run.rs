use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use widget_aws::DynamoTableStore;
use widget_core::app::{BackendTarget, PollerHandle, WorkerBuilder};
use widget_core::impls::{BucketWorkQueue, ObjectStoreBackend, TableStoreBackend};
use widget_core::ports::WidgetStore;

use super::s3_store;
use crate::args::RunArgs;

pub async fn run(args: RunArgs) -> Result<()> {
    let config = args.worker_config();
    let target = config.target().context("invalid worker configuration")?;

    let sdk_config =
        widget_aws::load_sdk_config(args.aws.region.clone(), args.aws.endpoint_url.clone()).await;

    let mut queue = BucketWorkQueue::new(Arc::new(s3_store(
        &sdk_config,
        &args.aws,
        &config.queue_bucket,
    )));
    if let Some(prefix) = &config.queue_prefix {
        queue = queue.with_prefix(prefix.clone());
    }

    // backend の選択は起動時に一度だけ
    let store: Arc<dyn WidgetStore> = match &target {
        BackendTarget::ObjectStore { bucket } => Arc::new(ObjectStoreBackend::new(Arc::new(
            s3_store(&sdk_config, &args.aws, bucket),
        ))),
        BackendTarget::TableStore { table } => Arc::new(TableStoreBackend::new(Arc::new(
            DynamoTableStore::new(&sdk_config, table.clone()),
        ))),
    };

    let poll_loop = WorkerBuilder::new()
        .queue(Arc::new(queue))
        .store(store)
        .settings(config.poll_settings())
        .build()?;

    info!(queue_bucket = %config.queue_bucket, backend = ?target, "starting widget worker");
    let handle = PollerHandle::spawn(poll_loop);

    shutdown_signal().await?;
    info!("shutdown requested, finishing in-flight request");
    handle
        .shutdown_and_join()
        .await
        .context("poll loop task failed")?;
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate()).context("install SIGTERM handler")?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.context("listen for ctrl-c")?,
        _ = terminate.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn shutdown_signal() -> Result<()> {
    tokio::signal::ctrl_c().await.context("listen for ctrl-c")
}
