//! Worker supervisor
//!
//! The [`Worker`] owns everything the two loops share and drives them:
//! the runner as a background task, the heartbeat loop on the calling
//! task. The runner is daemonic - shutdown never waits on a job stuck in
//! `run()`; it is aborted when the supervisor returns.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use gantry_client::MasterClient;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Config;
use crate::heartbeat;
use crate::runner;
use crate::service::{BlobStore, JobFactory};
use crate::state::SharedState;

/// A worker process: identity, Master client, shared state, collaborators
pub struct Worker {
    pub config: Config,
    pub client: MasterClient,
    pub state: SharedState,
    pub factory: Arc<dyn JobFactory>,
    pub blobs: Arc<dyn BlobStore>,

    /// Shared stop signal; both loops observe it at iteration boundaries
    stop: CancellationToken,

    /// Consecutive heartbeat transport failures since the last success
    consecutive_failures: AtomicU32,

    /// A fatal error deposited by the runner, surfaced by `serve_forever`
    fatal: Mutex<Option<anyhow::Error>>,
}

impl Worker {
    /// Creates a worker from its configuration and injected collaborators
    pub fn new(config: Config, factory: Arc<dyn JobFactory>, blobs: Arc<dyn BlobStore>) -> Self {
        let client =
            MasterClient::new(config.host.clone(), config.port).with_io_timeout(config.io_timeout);

        Self {
            config,
            client,
            state: SharedState::new(),
            factory,
            blobs,
            stop: CancellationToken::new(),
            consecutive_failures: AtomicU32::new(0),
            fatal: Mutex::new(None),
        }
    }

    /// Runs the worker until stop is requested or the retry budget runs out
    ///
    /// Spawns the runner loop in the background, then heartbeats on the
    /// calling task. Returns an error when the heartbeat retry budget is
    /// exhausted or when either loop hit an unrecoverable fault; a
    /// requested stop returns cleanly.
    pub async fn serve_forever(self: &Arc<Self>) -> Result<()> {
        info!(
            worker_id = %self.config.worker_id,
            master = %self.client.addr(),
            "worker starting"
        );

        let runner = tokio::spawn(runner::run_loop(Arc::clone(self)));

        while !self.stop.is_cancelled() {
            match heartbeat::heartbeat_iteration(self).await {
                Ok(()) => {
                    if self.consecutive_failures() > 0 {
                        info!("connected to master");
                    }
                    self.consecutive_failures.store(0, Ordering::SeqCst);
                }
                Err(err) if err.is_transport() => {
                    let attempt = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
                    warn!(
                        "failed to connect to master: attempt {}/{}",
                        attempt, self.config.number_of_attempts
                    );
                    if attempt >= self.config.number_of_attempts {
                        self.stop();
                        runner.abort();
                        return Err(anyhow::Error::new(err)
                            .context("heartbeat retry budget exhausted"));
                    }
                }
                Err(err) => {
                    self.stop();
                    runner.abort();
                    return Err(anyhow::Error::new(err).context("heartbeat failed"));
                }
            }
            self.idle_wait(self.config.heartbeat_interval).await;
        }

        // Daemonic runner: a job stuck in run() must not block shutdown.
        runner.abort();

        match self.take_fatal() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Requests a stop; both loops exit at their next iteration boundary
    pub fn stop(&self) {
        self.stop.cancel();
    }

    /// Whether a stop has been requested
    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Consecutive heartbeat transport failures since the last success
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::SeqCst)
    }

    /// Deposits an unrecoverable error and requests a stop
    pub fn fail_fatal(&self, err: anyhow::Error) {
        let mut fatal = self.fatal.lock().unwrap();
        // First fault wins; later ones are consequences.
        if fatal.is_none() {
            *fatal = Some(err);
        }
        drop(fatal);
        self.stop();
    }

    /// Takes the deposited fatal error, if any
    pub fn take_fatal(&self) -> Option<anyhow::Error> {
        self.fatal.lock().unwrap().take()
    }

    /// Sleeps between iterations, waking early when stop is requested
    pub async fn idle_wait(&self, period: Duration) {
        tokio::select! {
            _ = self.stop.cancelled() => {}
            _ = tokio::time::sleep(period) => {}
        }
    }
}
