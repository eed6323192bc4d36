//! Scrape loop: query, parse, publish, sleep.
//!
//! One cycle runs at a time. A console failure skips the game gauges for
//! that cycle; a parse failure skips only the affected field. Neither ends
//! the loop.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use exporter_core::{Command, RawReplySet, parse_replies};
use exporter_rcon::RemoteConsole;

use crate::registry::ExporterMetrics;
use crate::status::StatusBoard;

/// How a scrape cycle ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// Every field parsed and was published.
    Complete,
    /// The console answered but some replies could not be parsed.
    Partial { failed: Vec<Command> },
    /// The console could not be queried; no game gauge changed.
    TransportFailed { error: String },
}

/// Result of a single cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    pub elapsed: Duration,
}

/// Periodically scrapes a remote console into the exporter gauges.
pub struct Scraper<C> {
    console: C,
    metrics: ExporterMetrics,
    board: StatusBoard,
    interval: Duration,
    commands: BTreeMap<String, String>,
}

impl<C: RemoteConsole> Scraper<C> {
    pub fn new(console: C, metrics: ExporterMetrics, board: StatusBoard, interval: Duration) -> Self {
        Self {
            console,
            metrics,
            board,
            interval,
            commands: Command::batch(),
        }
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    /// Run one cycle: query, parse, update gauges, record the duration.
    pub async fn scrape_once(&self) -> CycleReport {
        let started = Instant::now();

        let outcome = match self.console.send_commands(&self.commands).await {
            Ok(labeled) => {
                let replies = RawReplySet::from_labeled(labeled);
                let status = parse_replies(&replies);

                let failures = status.failures();
                for (command, error) in &failures {
                    warn!(%command, %error, "failed to parse console reply");
                }

                self.metrics.record_status(&status);
                self.board.record_status(&status).await;

                if failures.is_empty() {
                    CycleOutcome::Complete
                } else {
                    CycleOutcome::Partial {
                        failed: failures.into_iter().map(|(command, _)| command).collect(),
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "console query failed, keeping previous values");
                CycleOutcome::TransportFailed {
                    error: e.to_string(),
                }
            }
        };

        let elapsed = started.elapsed();
        self.metrics.record_cycle_duration(elapsed);

        let report = CycleReport { outcome, elapsed };
        self.board.record_cycle(&report).await;

        debug!(
            outcome = ?report.outcome,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "scrape cycle finished"
        );
        report
    }

    /// Scrape immediately, then once per interval until shutdown.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(interval_secs = self.interval.as_secs(), "scraper started");

        loop {
            let report = self.scrape_once().await;
            let delay = next_delay(self.interval, report.elapsed);

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => {
                    info!("scraper shutting down");
                    break;
                }
            }
        }
    }
}

/// Time to sleep before the next cycle. Zero when the cycle overran.
pub fn next_delay(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::future::Future;
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use exporter_rcon::{RconError, RconResult};

    /// Console that plays back a fixed sequence of batch results.
    struct ScriptedConsole {
        script: Mutex<VecDeque<RconResult<HashMap<String, String>>>>,
        calls: AtomicUsize,
    }

    impl ScriptedConsole {
        fn with(results: Vec<RconResult<HashMap<String, String>>>) -> Self {
            Self {
                script: Mutex::new(results.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl RemoteConsole for ScriptedConsole {
        fn send_commands(
            &self,
            _commands: &BTreeMap<String, String>,
        ) -> impl Future<Output = RconResult<HashMap<String, String>>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(RconError::Closed));
            async move { next }
        }
    }

    fn replies(time: &str) -> HashMap<String, String> {
        HashMap::from([
            ("/version".to_string(), "2.0.28".to_string()),
            ("/time".to_string(), time.to_string()),
            ("/players".to_string(), "Players (1):\n  jsmith".to_string()),
            (
                "/players online".to_string(),
                "Online players (1):\n  jsmith (online)".to_string(),
            ),
        ])
    }

    fn good() -> RconResult<HashMap<String, String>> {
        Ok(replies("110 hours, 28 minutes and 57 seconds"))
    }

    fn scraper(results: Vec<RconResult<HashMap<String, String>>>) -> Scraper<ScriptedConsole> {
        Scraper::new(
            ScriptedConsole::with(results),
            ExporterMetrics::new("0.1.0").unwrap(),
            StatusBoard::new(),
            Duration::from_secs(10),
        )
    }

    #[test]
    fn delay_is_remaining_interval() {
        assert_eq!(
            next_delay(Duration::from_secs(10), Duration::from_secs(3)),
            Duration::from_secs(7)
        );
    }

    #[test]
    fn overrun_means_no_delay() {
        assert_eq!(
            next_delay(Duration::from_secs(10), Duration::from_secs(12)),
            Duration::ZERO
        );
    }

    #[tokio::test]
    async fn successful_cycle_updates_all_gauges() {
        let scraper = scraper(vec![good()]);
        let report = scraper.scrape_once().await;

        assert_eq!(report.outcome, CycleOutcome::Complete);
        assert_eq!(scraper.metrics.gamesave_age(), 110.48);
        assert_eq!(scraper.metrics.unique_player_count(), 1);
        assert_eq!(scraper.metrics.online_player_count(), 1);

        let output = scraper.metrics.render().unwrap();
        assert!(output.contains("game_version{game_version=\"2.0.28\"} 1"));
    }

    #[tokio::test]
    async fn transport_failure_keeps_game_gauges() {
        let scraper = scraper(vec![
            good(),
            Err(RconError::Protocol("garbled frame".to_string())),
        ]);
        scraper.scrape_once().await;
        scraper.metrics.record_cycle_duration(Duration::from_secs(99));

        let report = scraper.scrape_once().await;

        assert!(matches!(report.outcome, CycleOutcome::TransportFailed { .. }));
        assert_eq!(scraper.metrics.gamesave_age(), 110.48);
        assert_eq!(scraper.metrics.unique_player_count(), 1);
        assert_eq!(scraper.metrics.online_player_count(), 1);
        // Duration is recorded even for failed cycles.
        assert_ne!(scraper.metrics.process_time_s(), 99.0);
    }

    #[tokio::test]
    async fn parse_failure_skips_only_that_field() {
        let mut second = replies("3 seconds");
        second.insert("/players".to_string(), "Players (2):\n  jsmith\n  amy".to_string());
        let scraper = scraper(vec![good(), Ok(second)]);

        scraper.scrape_once().await;
        let report = scraper.scrape_once().await;

        assert_eq!(
            report.outcome,
            CycleOutcome::Partial {
                failed: vec![Command::Time]
            }
        );
        assert_eq!(scraper.metrics.gamesave_age(), 110.48);
        assert_eq!(scraper.metrics.unique_player_count(), 2);
    }

    #[tokio::test]
    async fn missing_reply_is_partial() {
        let mut partial = replies("1 hours, 0 minutes and 0 seconds");
        partial.remove("/players online");
        let scraper = scraper(vec![Ok(partial)]);

        let report = scraper.scrape_once().await;
        assert_eq!(
            report.outcome,
            CycleOutcome::Partial {
                failed: vec![Command::OnlinePlayers]
            }
        );
        assert_eq!(scraper.metrics.gamesave_age(), 1.0);
        assert_eq!(scraper.metrics.online_player_count(), 0);
    }

    #[tokio::test]
    async fn status_board_tracks_last_cycle() {
        let scraper = scraper(vec![Err(RconError::AuthRejected)]);
        scraper.scrape_once().await;

        let doc = scraper.board.snapshot().await;
        assert_eq!(doc.version, None);
        let summary = doc.last_cycle.unwrap();
        assert!(matches!(summary.outcome, CycleOutcome::TransportFailed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn run_scrapes_once_per_interval_until_shutdown() {
        let scraper = Arc::new(scraper(vec![good(), Err(RconError::Closed), good()]));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let runner = scraper.clone();
        let handle = tokio::spawn(async move { runner.run(shutdown_rx).await });

        // Cycles at t=0s, 10s and 20s.
        tokio::time::sleep(Duration::from_secs(25)).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        assert_eq!(scraper.console().calls(), 3);
        assert_eq!(scraper.metrics.gamesave_age(), 110.48);
    }
}
