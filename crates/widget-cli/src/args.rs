use clap::{Args, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use widget_core::app::{AckPolicy, StorageKind, WorkerConfig};
use widget_core::domain::REQUEST_PREFIX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageArg {
    /// Widgets as JSON objects in an S3 bucket
    #[value(name = "object-store", alias = "s3")]
    ObjectStore,
    /// Widgets as items in a DynamoDB table
    #[value(name = "table-store", alias = "dynamodb")]
    TableStore,
}

impl From<StorageArg> for StorageKind {
    fn from(arg: StorageArg) -> Self {
        match arg {
            StorageArg::ObjectStore => StorageKind::ObjectStore,
            StorageArg::TableStore => StorageKind::TableStore,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AckPolicyArg {
    /// Remove a request only after the backend call succeeded
    OnSuccess,
    /// Remove a request once dispatched, even if the backend call failed
    AfterDispatch,
}

impl From<AckPolicyArg> for AckPolicy {
    fn from(arg: AckPolicyArg) -> Self {
        match arg {
            AckPolicyArg::OnSuccess => AckPolicy::OnSuccess,
            AckPolicyArg::AfterDispatch => AckPolicy::AfterDispatch,
        }
    }
}

#[derive(Debug, Args)]
pub struct AwsArgs {
    /// AWS region (defaults to the SDK's provider chain)
    #[arg(long, env = "WIDGET_REGION")]
    pub region: Option<String>,

    /// Custom endpoint, e.g. LocalStack. Enables path-style S3 addressing.
    #[arg(long, env = "WIDGET_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Where widgets are stored
    #[arg(long, value_enum, env = "WIDGET_STORAGE")]
    pub storage: StorageArg,

    /// Widget bucket (object-store)
    #[arg(long, env = "WIDGET_BUCKET")]
    pub bucket: Option<String>,

    /// Widget table (table-store)
    #[arg(long, env = "WIDGET_TABLE")]
    pub table: Option<String>,

    /// Bucket polled for pending requests
    #[arg(long, env = "WIDGET_QUEUE_BUCKET")]
    pub queue_bucket: String,

    /// Only consider request keys under this prefix ("" for the whole bucket)
    #[arg(long, env = "WIDGET_QUEUE_PREFIX", default_value = REQUEST_PREFIX)]
    pub queue_prefix: String,

    /// Idle poll interval in milliseconds
    #[arg(long, env = "WIDGET_INTERVAL", default_value_t = 100)]
    pub interval: u64,

    /// When a request is removed from the queue
    #[arg(long, value_enum, env = "WIDGET_ACK_POLICY", default_value_t = AckPolicyArg::OnSuccess)]
    pub ack_policy: AckPolicyArg,

    #[command(flatten)]
    pub aws: AwsArgs,
}

impl RunArgs {
    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            storage: self.storage.into(),
            bucket: self.bucket.clone(),
            table: self.table.clone(),
            queue_bucket: self.queue_bucket.clone(),
            queue_prefix: Some(self.queue_prefix.clone()).filter(|prefix| !prefix.is_empty()),
            interval: Duration::from_millis(self.interval),
            ack_policy: self.ack_policy.into(),
        }
    }
}

#[derive(Debug, Args)]
pub struct EnqueueArgs {
    /// Bucket polled for pending requests
    #[arg(long, env = "WIDGET_QUEUE_BUCKET")]
    pub queue_bucket: String,

    /// JSON request file
    pub file: PathBuf,

    #[command(flatten)]
    pub aws: AwsArgs,
}
