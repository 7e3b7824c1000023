//! The job contract
//!
//! A [`Job`] is the runnable the worker builds from a `SET_JOB` payload.
//! Its internal structure is owned by the domain model; the worker only
//! ever runs it, kills it, and echoes the payload back to the Master.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use gantry_core::domain::job::JobPayload;
use gantry_core::domain::status::JobOutcome;

/// A unit of work the worker can execute
#[async_trait]
pub trait Job: Send + Sync {
    /// Runs the job to completion and reports how it went
    ///
    /// An `Err` means the job crashed rather than failed; the worker
    /// preserves the error report as the node's worker log.
    async fn run(&self) -> Result<JobOutcome>;

    /// Asks the job to terminate
    ///
    /// Advisory and idempotent. Must be safe to call while `run` is in
    /// flight; the worker's state machine moves only on `run` returning.
    fn kill(&self);
}

/// Builds runnable jobs from the payloads the Master hands out
pub trait JobFactory: Send + Sync {
    /// Turns a payload into something the worker can run
    fn build(&self, payload: &JobPayload) -> Result<Arc<dyn Job>>;
}
