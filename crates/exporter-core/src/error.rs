//! Error types for configuration loading and reply parsing.

use thiserror::Error;

/// Result type alias for reply parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// A single field of a scrape cycle could not be turned into a typed value.
///
/// Parse errors never abort a cycle; they only keep the affected gauge at
/// its previous value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no reply received for {0}")]
    MissingReply(String),

    #[error("empty reply")]
    EmptyReply,

    #[error("unexpected reply shape: {0:?}")]
    UnexpectedShape(String),

    #[error("invalid number {token:?} in reply")]
    InvalidNumber { token: String },

    #[error("no player count found in reply: {0:?}")]
    MissingCount(String),
}

/// Startup configuration is missing or unusable.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} still holds the placeholder value; set it to the server's RCON password")]
    Placeholder(&'static str),
}

impl ConfigError {
    /// Name of the environment variable the error refers to.
    pub fn variable(&self) -> &'static str {
        match self {
            ConfigError::Missing(name) | ConfigError::Placeholder(name) => name,
            ConfigError::Invalid { name, .. } => name,
        }
    }
}
