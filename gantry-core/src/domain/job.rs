//! Job payload domain types
//!
//! A job travels from the Master to a worker inside `SET_JOB`, rides along
//! in heartbeats while it runs, and is echoed back in the terminal report.
//! The worker treats it as opaque apart from the node id, the command an
//! executor runs, and the named log sinks.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::log::LogRef;

/// The body shuttled between Master and worker for one unit of work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPayload {
    pub node: Node,

    /// Free-form parameters the executor may consult
    #[serde(default)]
    pub parameters: HashMap<String, serde_json::Value>,
}

impl JobPayload {
    pub fn new(node: Node) -> Self {
        Self {
            node,
            parameters: HashMap::new(),
        }
    }
}

/// A graph node: the schedulable unit the Master hands out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node identifier; the `_id` wire name is stable
    #[serde(rename = "_id")]
    pub id: Uuid,

    /// Command the default executor runs for this node
    pub command: String,

    /// Named log sinks attached to this node
    #[serde(default)]
    pub logs: Vec<LogRef>,
}

impl Node {
    pub fn new(id: Uuid, command: impl Into<String>) -> Self {
        Self {
            id,
            command: command.into(),
            logs: Vec::new(),
        }
    }

    /// Attaches a named log sink
    pub fn with_log(mut self, log: LogRef) -> Self {
        self.logs.push(log);
        self
    }

    /// Looks up a log sink by name
    pub fn get_log_by_name(&self, name: &str) -> Option<&LogRef> {
        self.logs.iter().find(|log| log.name == name)
    }

    /// Looks up a log sink by name for mutation
    pub fn get_log_by_name_mut(&mut self, name: &str) -> Option<&mut LogRef> {
        self.logs.iter_mut().find(|log| log.name == name)
    }
}
