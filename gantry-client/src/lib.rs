//! Gantry Master Client
//!
//! A TCP client for communicating with the Gantry Master.
//!
//! The Master protocol is deliberately simple: every interaction opens a
//! fresh connection, sends one length-prefixed worker message, reads one
//! master message back, and closes. Connections are never pooled, so the
//! client itself holds no connection state and is freely shareable.
//!
//! # Example
//!
//! ```no_run
//! use gantry_client::MasterClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), gantry_client::ClientError> {
//!     let client = MasterClient::new("127.0.0.1", 10000);
//!
//!     let reply = client.get_job("worker-001").await?;
//!     println!("master answered: {:?}", reply.message_type);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod wire;

mod heartbeat;
mod jobs;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use gantry_core::proto::{MasterMessage, WorkerMessage};

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// Default deadline for each connect, write and read on a Master connection
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(5);

/// TCP client for the Gantry Master
///
/// Methods are grouped into logical interactions:
/// - Heartbeats (liveness + KILL delivery)
/// - Job lifecycle (acquisition, terminal reports)
#[derive(Debug, Clone)]
pub struct MasterClient {
    /// Master host
    host: String,
    /// Master port
    port: u16,
    /// Per-operation deadline; guards against half-open sockets
    io_timeout: Duration,
}

impl MasterClient {
    /// Creates a new Master client
    ///
    /// # Arguments
    /// * `host` - Master host (e.g., "127.0.0.1")
    /// * `port` - Master port (e.g., 10000)
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            io_timeout: DEFAULT_IO_TIMEOUT,
        }
    }

    /// Overrides the per-operation I/O deadline
    pub fn with_io_timeout(mut self, io_timeout: Duration) -> Self {
        self.io_timeout = io_timeout;
        self
    }

    /// The `host:port` this client connects to
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Performs one full interaction with the Master
    ///
    /// Opens a connection, sends `message`, reads the reply and closes.
    /// Transport faults (connect, read, write, deadline) are distinguished
    /// from codec faults via [`ClientError::is_transport`].
    pub async fn exchange(&self, message: &WorkerMessage) -> Result<MasterMessage> {
        let addr = self.addr();
        let payload = wire::encode(message)?;

        let mut stream = timeout(self.io_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| ClientError::Timeout(self.io_timeout))?
            .map_err(|source| ClientError::Connect { addr, source })?;

        debug!(
            message_type = ?message.message_type,
            run_status = %message.run_status,
            "sending message to master"
        );

        timeout(self.io_timeout, wire::write_message(&mut stream, &payload))
            .await
            .map_err(|_| ClientError::Timeout(self.io_timeout))??;

        let reply = timeout(self.io_timeout, wire::read_message(&mut stream))
            .await
            .map_err(|_| ClientError::Timeout(self.io_timeout))??;

        wire::decode(&reply)
    }
}
