//! Gantry Worker
//!
//! A stateless worker that executes graph jobs dispatched by the Gantry
//! Master.
//!
//! Architecture:
//! - Configuration: CLI flags with environment fallbacks
//! - Client: one TCP round trip per interaction with the Master
//! - State: the shared run-status record both loops cooperate through
//! - Runner loop: acquires jobs, runs them, reports terminal status
//! - Heartbeat loop: announces liveness, receives KILL commands
//!
//! The worker keeps no state across restarts; if it dies mid-job the
//! Master re-dispatches the work elsewhere.

mod config;
mod crash;
mod heartbeat;
mod runner;
mod service;
mod state;
mod supervisor;
#[cfg(test)]
mod testkit;

use std::sync::Arc;

use anyhow::Result;
use clap::{ArgAction, Parser};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, DEFAULT_HOST};
use crate::service::{FsBlobStore, ProcessJobFactory};
use crate::supervisor::Worker;

#[derive(Parser)]
#[command(name = "gantry-worker")]
#[command(about = "Run a Gantry worker", long_about = None)]
struct Cli {
    /// Worker identifier, unique across the cluster; generated when omitted
    #[arg(short = 'i', long, env = "GANTRY_WORKER_ID")]
    worker_id: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    /// Master host
    #[arg(short = 'H', long, env = "GANTRY_MASTER_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Master port
    #[arg(short = 'P', long, env = "GANTRY_MASTER_PORT", default_value_t = config::DEFAULT_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let config = Config::new(cli.worker_id.unwrap_or_default(), cli.host, cli.port);
    config.validate()?;

    info!(
        "Starting worker {} against {}:{}",
        config.worker_id, config.host, config.port
    );

    let factory = Arc::new(ProcessJobFactory::new());
    let blobs = Arc::new(FsBlobStore::new(config.blob_dir.clone()));
    let worker = Arc::new(Worker::new(config, factory, blobs));

    // A user interrupt is a graceful stop; both loops exit at their next
    // iteration boundary.
    {
        let worker = Arc::clone(&worker);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, stopping");
                worker.stop();
            }
        });
    }

    worker.serve_forever().await
}

/// Initializes logging; `RUST_LOG` overrides the `-v` mapping
fn init_tracing(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "gantry_worker=warn,gantry_client=warn",
        1 => "gantry_worker=info,gantry_client=info",
        2 => "gantry_worker=debug,gantry_client=debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
