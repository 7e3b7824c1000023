//! Process-backed job execution
//!
//! The default executor: a node's command runs as a shell subprocess.
//! Exit status zero maps to SUCCESS, anything else to FAILED; a kill
//! signals the child and lets `run` return through the normal path.

use std::process::Stdio;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::Notify;
use tracing::{debug, warn};
use uuid::Uuid;

use gantry_core::domain::job::JobPayload;
use gantry_core::domain::status::JobOutcome;

use crate::service::job::{Job, JobFactory};

/// A job that runs a node's command as a subprocess
pub struct ProcessJob {
    node_id: Uuid,
    command: String,
    kill_signal: Notify,
}

impl ProcessJob {
    pub fn new(node_id: Uuid, command: impl Into<String>) -> Self {
        Self {
            node_id,
            command: command.into(),
            kill_signal: Notify::new(),
        }
    }
}

#[async_trait]
impl Job for ProcessJob {
    async fn run(&self) -> Result<JobOutcome> {
        debug!(node_id = %self.node_id, command = %self.command, "spawning job command");

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to spawn command for node {}", self.node_id))?;

        let status = loop {
            tokio::select! {
                status = child.wait() => {
                    break status.with_context(|| {
                        format!("failed to reap command for node {}", self.node_id)
                    })?;
                }
                _ = self.kill_signal.notified() => {
                    debug!(node_id = %self.node_id, "delivering kill to job command");
                    if let Err(err) = child.start_kill() {
                        warn!(node_id = %self.node_id, "could not kill job command: {err}");
                    }
                    // Loop around; wait() reaps the killed child.
                }
            }
        };

        if status.success() {
            Ok(JobOutcome::Success)
        } else {
            debug!(node_id = %self.node_id, %status, "job command exited non-zero");
            Ok(JobOutcome::Failed)
        }
    }

    fn kill(&self) {
        // Stores a permit, so a kill landing before run() reaches the
        // select still takes effect.
        self.kill_signal.notify_one();
    }
}

/// Builds [`ProcessJob`]s from payloads
pub struct ProcessJobFactory;

impl ProcessJobFactory {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProcessJobFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl JobFactory for ProcessJobFactory {
    fn build(&self, payload: &JobPayload) -> Result<Arc<dyn Job>> {
        if payload.node.command.trim().is_empty() {
            anyhow::bail!("node {} carries no command to execute", payload.node.id);
        }

        Ok(Arc::new(ProcessJob::new(
            payload.node.id,
            payload.node.command.clone(),
        )))
    }
}
