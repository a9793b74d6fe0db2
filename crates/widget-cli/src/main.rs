//! widget-worker - widget request worker
//!
//! Commands:
//! - `widget-worker run` - poll the queue bucket and apply requests
//! - `widget-worker enqueue` - validate a request file and put it on the queue

mod args;
mod commands;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};

use args::{EnqueueArgs, RunArgs};

/// Process widget create/update/delete requests from an S3 work-queue bucket
#[derive(Parser)]
#[command(name = "widget-worker")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the queue bucket until interrupted
    Run(RunArgs),

    /// Validate a request file and add it to the queue bucket
    Enqueue(EnqueueArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Run(args) => commands::run::run(args).await,
        Commands::Enqueue(args) => commands::enqueue::run(args).await,
    }
}
