//! Heartbeat iteration
//!
//! One iteration announces the worker's status to the Master and handles
//! the one meaningful reply: KILL. Everything else the Master answers is
//! ignored. Liveness while a job runs is signalled exclusively here - the
//! runner holds no connection during execution.

use gantry_client::error::Result;
use gantry_core::proto::MasterMessageType;
use tracing::info;

use crate::supervisor::Worker;

/// Performs one heartbeat exchange with the Master
pub async fn heartbeat_iteration(worker: &Worker) -> Result<()> {
    let (run_status, body, graph_id) = worker.state.heartbeat_snapshot();

    let reply = worker
        .client
        .heartbeat(&worker.config.worker_id, run_status, body, graph_id)
        .await?;

    if reply.message_type == MasterMessageType::Kill {
        info!("received KILL from master");
        if worker.state.request_kill() {
            info!("delivered kill to the running job");
        } else {
            info!("already attempted to KILL");
        }
    }

    Ok(())
}
