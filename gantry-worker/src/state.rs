//! Shared worker state
//!
//! The runner and heartbeat loops cooperate through this one record:
//! run status, the current job and its graph, the kill latch, and the
//! handle of the runnable itself. A single mutex around the whole tuple
//! gives the ordering the loops need - a heartbeat that observes RUNNING
//! always sees the job and graph id published with it.

use std::sync::{Arc, Mutex};

use tracing::debug;
use uuid::Uuid;

use gantry_core::domain::job::JobPayload;
use gantry_core::domain::log::WORKER_LOG_NAME;
use gantry_core::domain::status::{JobOutcome, RunStatus};

use crate::service::Job;

/// The mutable per-worker record shared by both loops
pub struct SharedState {
    inner: Mutex<StateInner>,
}

struct StateInner {
    run_status: RunStatus,
    job: Option<JobPayload>,
    graph_id: Option<Uuid>,
    /// Kill latch: true once the job has been killed or has completed
    /// naturally, i.e. is no longer eligible for kill.
    job_killed: bool,
    running: Option<Arc<dyn Job>>,
}

impl StateInner {
    fn set_status(&mut self, run_status: RunStatus) {
        debug!(%run_status, "run status");
        self.run_status = run_status;
    }
}

impl SharedState {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StateInner {
                run_status: RunStatus::Idle,
                job: None,
                graph_id: None,
                job_killed: false,
                running: None,
            }),
        }
    }

    /// The worker's current run status
    pub fn status(&self) -> RunStatus {
        self.inner.lock().unwrap().run_status
    }

    /// What a heartbeat announces: status, and the job with its graph id
    /// whenever one is held (never while IDLE)
    pub fn heartbeat_snapshot(&self) -> (RunStatus, Option<JobPayload>, Option<Uuid>) {
        let inner = self.inner.lock().unwrap();
        let body = if inner.run_status.has_job() {
            inner.job.clone()
        } else {
            None
        };
        (inner.run_status, body, inner.graph_id)
    }

    /// Accepts a job assignment: IDLE -> RUNNING
    ///
    /// Re-opens the kill latch and publishes the job, graph id and
    /// runnable together with the RUNNING status.
    pub fn accept(&self, job: JobPayload, graph_id: Uuid, running: Arc<dyn Job>) {
        let mut inner = self.inner.lock().unwrap();
        inner.job_killed = false;
        inner.job = Some(job);
        inner.graph_id = Some(graph_id);
        inner.running = Some(running);
        inner.set_status(RunStatus::Running);
    }

    /// Records the job's outcome: RUNNING -> SUCCESS | FAILED
    ///
    /// Closes the kill latch - a completed job is no longer eligible for
    /// kill regardless of how it ended - and drops the runnable. The
    /// payload stays for the terminal report.
    pub fn finish(&self, outcome: JobOutcome) {
        let mut inner = self.inner.lock().unwrap();
        inner.job_killed = true;
        inner.running = None;
        inner.set_status(match outcome {
            JobOutcome::Success => RunStatus::Success,
            JobOutcome::Failed => RunStatus::Failed,
        });
    }

    /// What the terminal report carries, if the worker is in a terminal state
    pub fn terminal_report(&self) -> Option<(RunStatus, JobPayload, Uuid)> {
        let inner = self.inner.lock().unwrap();
        match inner.run_status {
            RunStatus::Success | RunStatus::Failed => {
                Some((inner.run_status, inner.job.clone()?, inner.graph_id?))
            }
            _ => None,
        }
    }

    /// Records the Master's receipt of the terminal report:
    /// SUCCESS | FAILED -> IDLE
    ///
    /// Ignored in any other state; the worker never skips a terminal
    /// state on its way back to IDLE.
    pub fn acknowledge(&self) {
        let mut inner = self.inner.lock().unwrap();
        if matches!(inner.run_status, RunStatus::Success | RunStatus::Failed) {
            inner.job = None;
            inner.graph_id = None;
            inner.set_status(RunStatus::Idle);
        }
    }

    /// Delivers a KILL through the latch
    ///
    /// Returns true when the running job was actually killed. A job that
    /// was already killed, already finished, or never existed leaves the
    /// latch untouched and returns false.
    pub fn request_kill(&self) -> bool {
        // Latch under the lock; a concurrent second KILL sees it closed.
        // The delivery itself happens outside the guard.
        let running = {
            let mut inner = self.inner.lock().unwrap();
            match (&inner.running, inner.job_killed) {
                (Some(running), false) => {
                    let running = Arc::clone(running);
                    inner.job_killed = true;
                    running
                }
                _ => return false,
            }
        };
        running.kill();
        true
    }

    /// Stamps the running job's worker log sink with an uploaded resource id
    ///
    /// Returns false when no job is held or the node carries no sink
    /// named for the worker.
    pub fn assign_worker_log(&self, resource_id: &str) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let Some(job) = inner.job.as_mut() else {
            return false;
        };
        match job.node.get_log_by_name_mut(WORKER_LOG_NAME) {
            Some(log) => {
                log.resource_id = Some(resource_id.to_string());
                true
            }
            None => false,
        }
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
