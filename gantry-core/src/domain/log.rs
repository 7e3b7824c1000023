//! Log sink references attached to graph nodes

use serde::{Deserialize, Serialize};

/// Name of the log sink the worker writes crash reports to
pub const WORKER_LOG_NAME: &str = "worker";

/// A named log sink on a node
///
/// The sink itself lives in the blob store; `resource_id` points at the
/// uploaded content once something has been written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRef {
    pub name: String,

    /// Blob store handle for the uploaded log, if any
    #[serde(default)]
    pub resource_id: Option<String>,
}

impl LogRef {
    /// Creates an empty sink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_id: None,
        }
    }
}
