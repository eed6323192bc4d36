//! Last-known status document served on `/status`.
//!
//! Mirrors the gauges: each field holds the last value that parsed and is
//! left alone when a later cycle fails to produce it.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tokio::sync::RwLock;

use exporter_core::ParsedStatus;

use crate::scraper::{CycleOutcome, CycleReport};

/// JSON view of the latest console status.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusDocument {
    #[serde(rename = "/version")]
    pub version: Option<String>,
    #[serde(rename = "/time")]
    pub elapsed_hours: Option<f64>,
    #[serde(rename = "/players")]
    pub registered_players: Option<Vec<String>>,
    #[serde(rename = "/players online")]
    pub online_players: Option<Vec<String>>,
    pub last_cycle: Option<CycleSummary>,
}

/// Outcome of the most recent scrape cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleSummary {
    #[serde(flatten)]
    pub outcome: CycleOutcome,
    pub duration_s: f64,
    /// Unix time the cycle finished.
    pub finished_at: u64,
}

/// Shared, lock-protected [`StatusDocument`].
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    inner: Arc<RwLock<StatusDocument>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite every field that parsed.
    pub async fn record_status(&self, status: &ParsedStatus) {
        let mut doc = self.inner.write().await;
        if let Ok(version) = &status.version {
            doc.version = Some(version.clone());
        }
        if let Ok(hours) = status.elapsed_hours {
            doc.elapsed_hours = Some(hours);
        }
        if let Ok(players) = &status.registered_players {
            doc.registered_players = Some(players.clone());
        }
        if let Ok(players) = &status.online_players {
            doc.online_players = Some(players.clone());
        }
    }

    pub async fn record_cycle(&self, report: &CycleReport) {
        let mut doc = self.inner.write().await;
        doc.last_cycle = Some(CycleSummary {
            outcome: report.outcome.clone(),
            duration_s: report.elapsed.as_secs_f64(),
            finished_at: epoch_secs(),
        });
    }

    pub async fn snapshot(&self) -> StatusDocument {
        self.inner.read().await.clone()
    }
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
