//! Run status and job outcome enumerations

use serde::{Deserialize, Serialize};

/// A worker's relationship to its assigned job
///
/// Every worker is in exactly one of these states at any time. The wire
/// names are stable across worker and Master.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    /// No job assigned; the worker is polling for one
    Idle,

    /// A job is currently executing
    Running,

    /// The last job finished successfully; terminal report not yet acknowledged
    Success,

    /// The last job failed; terminal report not yet acknowledged
    Failed,
}

impl RunStatus {
    /// Whether this status carries a job in heartbeats and terminal reports
    pub fn has_job(&self) -> bool {
        !matches!(self, RunStatus::Idle)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Idle => write!(f, "IDLE"),
            RunStatus::Running => write!(f, "RUNNING"),
            RunStatus::Success => write!(f, "SUCCESS"),
            RunStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// What a job execution reported when it returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobOutcome {
    Success,
    Failed,
}

impl std::fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobOutcome::Success => write!(f, "SUCCESS"),
            JobOutcome::Failed => write!(f, "FAILED"),
        }
    }
}
