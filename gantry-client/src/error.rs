//! Error types for the Gantry Master client

use std::time::Duration;

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while talking to the Master
#[derive(Debug, Error)]
pub enum ClientError {
    /// TCP connect failed
    #[error("failed to connect to master at {addr}: {source}")]
    Connect {
        /// Address the connect was aimed at
        addr: String,
        /// Underlying socket error
        source: std::io::Error,
    },

    /// Read or write on an established connection failed
    #[error("i/o error talking to master: {0}")]
    Io(#[from] std::io::Error),

    /// An operation missed its deadline
    #[error("master did not answer within {0:?}")]
    Timeout(Duration),

    /// A frame announced a length over the cap
    #[error("frame of {0} bytes exceeds the frame size limit")]
    FrameTooLarge(usize),

    /// Failed to serialize an outgoing message
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    /// Failed to deserialize an incoming message
    #[error("failed to decode message: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ClientError {
    /// Whether this error is a transient network fault
    ///
    /// Transport faults are retried by the caller; codec faults mean the
    /// two sides disagree about the protocol and retrying cannot help.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. } | Self::Io(_) | Self::Timeout(_)
        )
    }
}
