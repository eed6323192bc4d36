//! exporter-core — shared types for the RCON status exporter.
//!
//! Holds the fixed set of console commands issued every scrape cycle,
//! the parsers that turn their human-readable replies into typed values,
//! and the environment-sourced exporter configuration.
//!
//! # Architecture
//!
//! ```text
//! RawReplySet (Command → reply text)
//!   └── parse_replies() → ParsedStatus (one Result per field)
//!
//! ExporterConfig::from_env() → validated startup configuration
//! ```

pub mod config;
pub mod error;
pub mod parser;
pub mod types;

pub use config::{ExporterConfig, RconTarget};
pub use error::{ConfigError, ConfigResult, ParseError, ParseResult};
pub use parser::{ParsedStatus, parse_replies};
pub use types::*;
