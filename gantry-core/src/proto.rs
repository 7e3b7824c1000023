//! Worker↔Master protocol messages
//!
//! Every interaction is one worker message answered by one master message
//! over a fresh connection. The message-type wire names below are stable
//! across the cluster and must not change.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::job::JobPayload;
use crate::domain::status::RunStatus;

/// What a worker is asking of the Master
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerMessageType {
    /// Periodic liveness announcement; also the channel KILL arrives on
    #[serde(rename = "HEARTBEAT")]
    Heartbeat,

    /// Idle worker requesting a job
    #[serde(rename = "GET_JOB")]
    GetJob,

    /// Terminal report: the job finished successfully
    #[serde(rename = "JOB_FINISHED_SUCCESS")]
    JobFinishedSuccess,

    /// Terminal report: the job failed
    #[serde(rename = "JOB_FINISHED_FAILED")]
    JobFinishedFailed,
}

/// What the Master answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MasterMessageType {
    /// A job assignment in reply to `GET_JOB`
    #[serde(rename = "SET_JOB")]
    SetJob,

    /// Terminate the running job; advisory
    #[serde(rename = "KILL")]
    Kill,

    /// Receipt of the worker's message. The spelling is historical and
    /// load-bearing; both sides of the cluster expect it.
    #[serde(rename = "AKNOWLEDGE")]
    Aknowledge,
}

/// A message from a worker to the Master
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerMessage {
    pub worker_id: String,
    pub run_status: RunStatus,
    pub message_type: WorkerMessageType,

    /// The current job, absent while idle
    #[serde(default)]
    pub body: Option<JobPayload>,

    /// The graph the current job belongs to, absent while idle
    #[serde(default)]
    pub graph_id: Option<Uuid>,
}

impl WorkerMessage {
    /// Builds a heartbeat carrying the worker's current status and job
    pub fn heartbeat(
        worker_id: impl Into<String>,
        run_status: RunStatus,
        body: Option<JobPayload>,
        graph_id: Option<Uuid>,
    ) -> Self {
        Self {
            worker_id: worker_id.into(),
            run_status,
            message_type: WorkerMessageType::Heartbeat,
            body,
            graph_id,
        }
    }

    /// Builds an idle worker's job request
    pub fn get_job(worker_id: impl Into<String>) -> Self {
        Self {
            worker_id: worker_id.into(),
            run_status: RunStatus::Idle,
            message_type: WorkerMessageType::GetJob,
            body: None,
            graph_id: None,
        }
    }

    /// Builds the terminal report for a finished job
    ///
    /// `run_status` must be `Success` or `Failed`; the body is the same
    /// payload `SET_JOB` delivered.
    pub fn job_finished(
        worker_id: impl Into<String>,
        run_status: RunStatus,
        body: JobPayload,
        graph_id: Uuid,
    ) -> Self {
        let message_type = match run_status {
            RunStatus::Failed => WorkerMessageType::JobFinishedFailed,
            _ => WorkerMessageType::JobFinishedSuccess,
        };
        Self {
            worker_id: worker_id.into(),
            run_status,
            message_type,
            body: Some(body),
            graph_id: Some(graph_id),
        }
    }
}

/// A message from the Master to a worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterMessage {
    pub message_type: MasterMessageType,

    /// The assigned job, present on `SET_JOB`
    #[serde(default)]
    pub job: Option<JobPayload>,

    /// The graph the assigned job belongs to, present on `SET_JOB`
    #[serde(default)]
    pub graph_id: Option<Uuid>,
}

impl MasterMessage {
    /// Builds a job assignment
    pub fn set_job(job: JobPayload, graph_id: Uuid) -> Self {
        Self {
            message_type: MasterMessageType::SetJob,
            job: Some(job),
            graph_id: Some(graph_id),
        }
    }

    /// Builds a kill command
    pub fn kill() -> Self {
        Self {
            message_type: MasterMessageType::Kill,
            job: None,
            graph_id: None,
        }
    }

    /// Builds a receipt
    pub fn aknowledge() -> Self {
        Self {
            message_type: MasterMessageType::Aknowledge,
            job: None,
            graph_id: None,
        }
    }
}
