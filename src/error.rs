//! Error types for the queue-daemon client
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using ClientError
pub type Result<T> = std::result::Result<T, ClientError>;

/// Unified error type for client operations
#[derive(Debug, Error)]
pub enum ClientError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection closed by server")]
    Disconnected,

    // -------------------------------------------------------------------------
    // Parse Errors
    // -------------------------------------------------------------------------
    #[error("parse error: {0}")]
    Parse(String),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    /// The server rejected a command; carries the server's literal
    /// response line.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl ClientError {
    /// Whether the error indicates a broken transport.
    ///
    /// Transport errors tear down the connection; the next command
    /// reconnects from scratch, and the event-stream loop retries
    /// internally.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Io(_) | ClientError::Disconnected)
    }
}
