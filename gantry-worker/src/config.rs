//! Worker configuration
//!
//! Defines all configurable parameters for the worker including the Master
//! endpoint, loop cadences, the heartbeat retry budget and the crash-log
//! spool directory.

use std::path::PathBuf;
use std::time::Duration;

use gantry_client::DEFAULT_IO_TIMEOUT;
use uuid::Uuid;

/// Default Master host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default Master port
pub const DEFAULT_PORT: u16 = 10000;

/// Worker configuration
///
/// Cadences and the retry budget are configurable to allow tuning for
/// different deployments; the defaults match the cluster-wide contract.
#[derive(Debug, Clone)]
pub struct Config {
    /// Identifier for this worker, unique across the cluster
    pub worker_id: String,

    /// Master host
    pub host: String,

    /// Master port
    pub port: u16,

    /// Pause between heartbeat iterations
    pub heartbeat_interval: Duration,

    /// Pause between runner iterations
    pub runner_interval: Duration,

    /// Consecutive heartbeat transport failures tolerated before shutdown
    pub number_of_attempts: u32,

    /// Deadline for each connect, read and write against the Master
    pub io_timeout: Duration,

    /// Directory the filesystem blob store spools crash logs into
    pub blob_dir: PathBuf,
}

impl Config {
    /// Creates a configuration with defaults
    ///
    /// An empty `worker_id` is replaced with a freshly generated unique id.
    pub fn new(worker_id: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        let mut worker_id = worker_id.into();
        if worker_id.is_empty() {
            worker_id = Uuid::new_v4().to_string();
        }

        Self {
            worker_id,
            host: host.into(),
            port,
            heartbeat_interval: Duration::from_secs(1),
            runner_interval: Duration::from_secs(1),
            number_of_attempts: 10,
            io_timeout: DEFAULT_IO_TIMEOUT,
            blob_dir: std::env::temp_dir().join("gantry-worker-logs"),
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.worker_id.is_empty() {
            anyhow::bail!("worker_id cannot be empty");
        }

        if self.host.is_empty() {
            anyhow::bail!("host cannot be empty");
        }

        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.heartbeat_interval.is_zero() || self.runner_interval.is_zero() {
            anyhow::bail!("loop intervals must be greater than 0");
        }

        if self.number_of_attempts == 0 {
            anyhow::bail!("number_of_attempts must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("", DEFAULT_HOST, DEFAULT_PORT)
    }
}
