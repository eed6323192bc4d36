//! Environment-sourced exporter configuration.
//!
//! | Variable | Required | Default |
//! |---|---|---|
//! | `FACTORIO_EXPORTER_PORT` | no | 9042 |
//! | `SCRAPE_INTERVAL_S` | yes | |
//! | `FACTORIO_RCON_HOST` | yes | |
//! | `FACTORIO_RCON_PORT` | yes | |
//! | `FACTORIO_RCON_PASSWORD` | yes | |
//! | `FACTORIO_RCON_TIMEOUT_S` | no | 10 |

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};

pub const EXPORTER_PORT: &str = "FACTORIO_EXPORTER_PORT";
pub const SCRAPE_INTERVAL: &str = "SCRAPE_INTERVAL_S";
pub const RCON_HOST: &str = "FACTORIO_RCON_HOST";
pub const RCON_PORT: &str = "FACTORIO_RCON_PORT";
pub const RCON_PASSWORD: &str = "FACTORIO_RCON_PASSWORD";
pub const RCON_TIMEOUT: &str = "FACTORIO_RCON_TIMEOUT_S";

/// Password value shipped in the sample `.env`; never a real credential.
pub const PLACEHOLDER_PASSWORD: &str = "placeholdersecret";

pub const DEFAULT_EXPORTER_PORT: u16 = 9042;
pub const DEFAULT_RCON_TIMEOUT_SECS: u64 = 10;

/// Where and how to reach the game server's remote console.
#[derive(Clone)]
pub struct RconTarget {
    pub host: String,
    pub port: u16,
    pub password: String,
    /// Upper bound for one whole console exchange.
    pub timeout: Duration,
}

impl RconTarget {
    /// `host:port` form for socket connects.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for RconTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RconTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Validated startup configuration.
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// Port the metrics endpoint listens on.
    pub exporter_port: u16,
    pub scrape_interval: Duration,
    pub rcon: RconTarget,
}

impl ExporterConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let password = required(&lookup, RCON_PASSWORD)?;
        if password == PLACEHOLDER_PASSWORD {
            return Err(ConfigError::Placeholder(RCON_PASSWORD));
        }

        let host = required(&lookup, RCON_HOST)?;
        let port = parse_var(RCON_PORT, &required(&lookup, RCON_PORT)?)?;

        let exporter_port = match lookup(EXPORTER_PORT) {
            Some(raw) => parse_var(EXPORTER_PORT, &raw)?,
            None => DEFAULT_EXPORTER_PORT,
        };

        let scrape_interval = positive_secs(SCRAPE_INTERVAL, &required(&lookup, SCRAPE_INTERVAL)?)?;

        let timeout = match lookup(RCON_TIMEOUT) {
            Some(raw) => positive_secs(RCON_TIMEOUT, &raw)?,
            None => Duration::from_secs(DEFAULT_RCON_TIMEOUT_SECS),
        };

        Ok(Self {
            exporter_port,
            scrape_interval,
            rcon: RconTarget {
                host,
                port,
                password,
                timeout,
            },
        })
    }
}

fn required<F>(lookup: &F, name: &'static str) -> ConfigResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn parse_var<T>(name: &'static str, raw: &str) -> ConfigResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn positive_secs(name: &'static str, raw: &str) -> ConfigResult<Duration> {
    let secs: u64 = parse_var(name, raw)?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            name,
            value: raw.to_string(),
            reason: "must be at least 1 second".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}
