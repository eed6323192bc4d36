//! Exporter gauges and Prometheus text exposition.
//!
//! All gauges live in one [`Registry`] owned by [`ExporterMetrics`]. The
//! handle is cheap to clone; the scrape loop writes through one clone while
//! the HTTP handler renders through another. Gauge values are atomics, so
//! a render that races a cycle sees each gauge at either its old or its new
//! value.

use std::time::Duration;

use prometheus::{Encoder, Gauge, GaugeVec, IntGauge, Opts, Registry, TextEncoder};

use exporter_core::ParsedStatus;

/// Gauges published by the exporter.
#[derive(Clone)]
pub struct ExporterMetrics {
    registry: Registry,
    game_version: GaugeVec,
    gamesave_age: Gauge,
    unique_player_count: IntGauge,
    online_player_count: IntGauge,
    process_time_s: Gauge,
}

impl ExporterMetrics {
    /// Register all gauges and stamp the exporter build version.
    pub fn new(build_ver: &str) -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let game_version = GaugeVec::new(
            Opts::new(
                "game_version",
                "Game version running on the server (RCON `/version`)",
            ),
            &["game_version"],
        )?;
        let gamesave_age = Gauge::new(
            "gamesave_age",
            "How old the save is in hours (RCON `/time`)",
        )?;
        let unique_player_count = IntGauge::new(
            "unique_player_count",
            "Number of unique players that have joined (RCON `/players`)",
        )?;
        let online_player_count = IntGauge::new(
            "online_player_count",
            "Number of online players (RCON `/players online`)",
        )?;
        let process_time_s = Gauge::new(
            "exporter_process_time_s",
            "Time to scrape and process the last cycle, in seconds",
        )?;
        let build_info = GaugeVec::new(
            Opts::new("exporter_build_info", "Exporter build version"),
            &["build_ver"],
        )?;

        registry.register(Box::new(game_version.clone()))?;
        registry.register(Box::new(gamesave_age.clone()))?;
        registry.register(Box::new(unique_player_count.clone()))?;
        registry.register(Box::new(online_player_count.clone()))?;
        registry.register(Box::new(process_time_s.clone()))?;
        registry.register(Box::new(build_info.clone()))?;

        build_info.with_label_values(&[build_ver]).set(1.0);

        Ok(Self {
            registry,
            game_version,
            gamesave_age,
            unique_player_count,
            online_player_count,
            process_time_s,
        })
    }

    /// Overwrite the gauges of every field that parsed.
    ///
    /// Failed fields leave their gauge at the last written value.
    pub fn record_status(&self, status: &ParsedStatus) {
        if let Ok(version) = &status.version {
            self.game_version.with_label_values(&[version.as_str()]).set(1.0);
        }
        if let Ok(hours) = status.elapsed_hours {
            self.gamesave_age.set(hours);
        }
        if let Ok(players) = &status.registered_players {
            self.unique_player_count.set(players.len() as i64);
        }
        if let Ok(players) = &status.online_players {
            self.online_player_count.set(players.len() as i64);
        }
    }

    /// Record how long the last scrape cycle took.
    pub fn record_cycle_duration(&self, elapsed: Duration) {
        self.process_time_s.set(elapsed.as_secs_f64());
    }

    pub fn gamesave_age(&self) -> f64 {
        self.gamesave_age.get()
    }

    pub fn unique_player_count(&self) -> i64 {
        self.unique_player_count.get()
    }

    pub fn online_player_count(&self) -> i64 {
        self.online_player_count.get()
    }

    pub fn process_time_s(&self) -> f64 {
        self.process_time_s.get()
    }

    /// Render every registered gauge in the Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl std::fmt::Debug for ExporterMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExporterMetrics")
            .field("gamesave_age", &self.gamesave_age.get())
            .field("unique_player_count", &self.unique_player_count.get())
            .field("online_player_count", &self.online_player_count.get())
            .field("process_time_s", &self.process_time_s.get())
            .finish_non_exhaustive()
    }
}
