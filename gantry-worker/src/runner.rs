//! Runner loop
//!
//! The background activity that acquires and executes jobs. Each
//! iteration dispatches on the worker's run status: idle workers ask the
//! Master for a job and run whatever `SET_JOB` delivers to completion;
//! workers holding a terminal status re-send the report until the Master
//! acknowledges it. Transport faults are swallowed and retried next
//! tick; anything else stops the worker.
//!
//! The connection is never held across `run()` - it is opened just long
//! enough to receive `SET_JOB`, then closed.

use std::sync::Arc;

use anyhow::{Context, Result};
use gantry_client::ClientError;
use gantry_core::domain::status::{JobOutcome, RunStatus};
use gantry_core::proto::MasterMessageType;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::crash;
use crate::supervisor::Worker;

/// The runner observed RUNNING at the top of an iteration
///
/// RUNNING is an intra-iteration state: the loop enters it and leaves it
/// within a single pass. Seeing it here means the state machine was
/// corrupted, and the worker aborts rather than guess.
#[derive(Debug, Error)]
#[error("runner loop observed RUNNING at the start of an iteration")]
pub struct IllegalStateError;

/// Drives runner iterations until stop is requested
pub async fn run_loop(worker: Arc<Worker>) {
    while !worker.is_stopped() {
        if let Err(err) = run_iteration(&worker).await {
            match err.downcast_ref::<ClientError>() {
                Some(client_err) if client_err.is_transport() => {
                    // The heartbeat loop owns liveness accounting; the
                    // runner just tries again next tick.
                    debug!("master unreachable from runner loop: {err:#}");
                }
                _ => {
                    error!("runner iteration failed: {err:#}");
                    worker.fail_fatal(err);
                    break;
                }
            }
        }
        worker.idle_wait(worker.config.runner_interval).await;
    }
    info!("runner loop exited");
}

async fn run_iteration(worker: &Arc<Worker>) -> Result<()> {
    match worker.state.status() {
        RunStatus::Idle => acquire_and_run(worker).await,
        RunStatus::Running => Err(IllegalStateError.into()),
        RunStatus::Success | RunStatus::Failed => report_finished(worker).await,
    }
}

/// Asks the Master for a job and, if one is assigned, runs it to completion
async fn acquire_and_run(worker: &Arc<Worker>) -> Result<()> {
    let reply = worker.client.get_job(&worker.config.worker_id).await?;
    debug!(reply_type = ?reply.message_type, "asked master for a job");

    if reply.message_type != MasterMessageType::SetJob {
        return Ok(());
    }
    let (Some(job), Some(graph_id)) = (reply.job, reply.graph_id) else {
        warn!("SET_JOB reply carried no job or graph id; staying idle");
        return Ok(());
    };

    info!(%graph_id, job_id = %job.node.id, "got a job");

    let running = worker
        .factory
        .build(&job)
        .context("failed to build a runnable job from the payload")?;
    worker.state.accept(job, graph_id, Arc::clone(&running));

    let outcome = match running.run().await {
        Ok(outcome) => outcome,
        Err(job_err) => {
            warn!("job crashed: {job_err:#}");
            match crash::preserve_crash_log(worker, &job_err).await {
                Ok(resource_id) => {
                    debug!(%resource_id, "crash log uploaded");
                }
                Err(capture_err) => {
                    // Log loss is not tolerated: stop the worker and
                    // surface the capture failure.
                    error!("failed to preserve the crash log: {capture_err:#}");
                    worker.fail_fatal(capture_err);
                }
            }
            JobOutcome::Failed
        }
    };

    worker.state.finish(outcome);
    info!(
        worker_id = %worker.config.worker_id,
        status = %worker.state.status(),
        "job finished"
    );
    Ok(())
}

/// Re-sends the terminal report; returns to IDLE once the Master acknowledges
async fn report_finished(worker: &Arc<Worker>) -> Result<()> {
    let Some((run_status, job, graph_id)) = worker.state.terminal_report() else {
        return Ok(());
    };

    let reply = worker
        .client
        .job_finished(&worker.config.worker_id, run_status, job, graph_id)
        .await?;

    if reply.message_type == MasterMessageType::Aknowledge {
        worker.state.acknowledge();
    }
    Ok(())
}
