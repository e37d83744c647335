//! Error types for streamhub
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using HubError
pub type Result<T> = std::result::Result<T, HubError>;

/// Unified error type for streamhub operations
#[derive(Debug, Error)]
pub enum HubError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Configuration Errors (construction time only)
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Bind Errors (connect time only)
    // -------------------------------------------------------------------------
    #[error("Error binding: {0}")]
    Bind(String),

    // -------------------------------------------------------------------------
    // Framing Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Per-client read outcomes (classified for the aggregator loop)
    // -------------------------------------------------------------------------
    /// Read hit the configured timeout with no complete packet.
    #[error("Read timed out")]
    Timeout,

    /// Peer closed the connection in an orderly fashion.
    #[error("Peer disconnected")]
    Disconnected,

    // -------------------------------------------------------------------------
    // Write-hook Errors
    // -------------------------------------------------------------------------
    #[error("Write hook error: {0}")]
    WriteHook(String),
}

impl HubError {
    /// Classify an I/O error observed while reading from a client.
    ///
    /// EOF and peer resets are orderly disconnects; timeouts surface as
    /// `Timeout` so read loops can keep polling. Everything else stays `Io`.
    pub fn from_read_error(e: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match e.kind() {
            ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe => HubError::Disconnected,
            ErrorKind::WouldBlock | ErrorKind::TimedOut => HubError::Timeout,
            _ => HubError::Io(e),
        }
    }
}
