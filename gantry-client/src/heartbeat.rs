//! Heartbeat interaction

use uuid::Uuid;

use crate::MasterClient;
use crate::error::Result;
use gantry_core::domain::job::JobPayload;
use gantry_core::domain::status::RunStatus;
use gantry_core::proto::{MasterMessage, WorkerMessage};

impl MasterClient {
    /// Announces liveness and the worker's current status
    ///
    /// The reply may be a `KILL` command; anything else carries no meaning
    /// for the worker. `body` is the current job when one is held and
    /// `None` while idle.
    ///
    /// # Arguments
    /// * `worker_id` - The ID of the worker sending the heartbeat
    /// * `run_status` - The worker's current run status
    /// * `body` - The current job, if any
    /// * `graph_id` - The enclosing graph, if any
    pub async fn heartbeat(
        &self,
        worker_id: &str,
        run_status: RunStatus,
        body: Option<JobPayload>,
        graph_id: Option<Uuid>,
    ) -> Result<MasterMessage> {
        self.exchange(&WorkerMessage::heartbeat(
            worker_id, run_status, body, graph_id,
        ))
        .await
    }
}
