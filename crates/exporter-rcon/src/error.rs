//! RCON transport errors.

use thiserror::Error;

/// Result type alias for console operations.
pub type RconResult<T> = Result<T, RconError>;

/// A console exchange failed. Every variant aborts the current batch only.
#[derive(Debug, Error)]
pub enum RconError {
    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("authentication rejected by server")]
    AuthRejected,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("console exchange timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("connection closed by server")]
    Closed,
}
