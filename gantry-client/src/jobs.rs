//! Job lifecycle interactions

use uuid::Uuid;

use crate::MasterClient;
use crate::error::Result;
use gantry_core::domain::job::JobPayload;
use gantry_core::domain::status::RunStatus;
use gantry_core::proto::{MasterMessage, WorkerMessage};

impl MasterClient {
    /// Requests a job for an idle worker
    ///
    /// The Master answers `SET_JOB` with a payload when it has work for
    /// this worker, or a bare receipt otherwise.
    ///
    /// # Arguments
    /// * `worker_id` - The ID of the requesting worker
    pub async fn get_job(&self, worker_id: &str) -> Result<MasterMessage> {
        self.exchange(&WorkerMessage::get_job(worker_id)).await
    }

    /// Reports a finished job
    ///
    /// The body is the same payload `SET_JOB` delivered, echoed back with
    /// its graph id so the Master can correlate. The worker keeps
    /// re-sending the report each tick until the Master answers
    /// `AKNOWLEDGE`.
    ///
    /// # Arguments
    /// * `worker_id` - The ID of the reporting worker
    /// * `run_status` - `Success` or `Failed`
    /// * `body` - The finished job
    /// * `graph_id` - The graph the job belongs to
    pub async fn job_finished(
        &self,
        worker_id: &str,
        run_status: RunStatus,
        body: JobPayload,
        graph_id: Uuid,
    ) -> Result<MasterMessage> {
        self.exchange(&WorkerMessage::job_finished(
            worker_id, run_status, body, graph_id,
        ))
        .await
    }
}
