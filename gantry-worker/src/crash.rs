//! Crash-log preservation
//!
//! When a job crashes (its `run` returns an error rather than an
//! outcome), the worker spools the error report, uploads it to the blob
//! store, and stamps the resulting resource id onto the node's worker
//! log sink so the Master can surface it. Losing this report is treated
//! as an unrecoverable fault by the caller.

use anyhow::{Context, Result};

use gantry_core::domain::log::WORKER_LOG_NAME;

use crate::service::ByteStream;
use crate::supervisor::Worker;

/// Uploads a crashed job's error report and attaches it to the node
///
/// # Returns
/// The resource id the report was stored under
pub async fn preserve_crash_log(worker: &Worker, job_err: &anyhow::Error) -> Result<String> {
    let report = format!("{job_err:?}\n");
    let stream: ByteStream = Box::new(std::io::Cursor::new(report.into_bytes()));

    let resource_id = worker
        .blobs
        .upload_stream(stream)
        .await
        .context("failed to upload the crash log to the blob store")?;

    if !worker.state.assign_worker_log(&resource_id) {
        anyhow::bail!("running job has no `{WORKER_LOG_NAME}` log sink to attach the crash log to");
    }

    Ok(resource_id)
}
