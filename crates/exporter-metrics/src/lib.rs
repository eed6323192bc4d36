//! exporter-metrics — gauges, scrape loop, and pull endpoint.
//!
//! Turns parsed console status into Prometheus gauges and serves them to
//! a pull-based collector.
//!
//! # Architecture
//!
//! ```text
//! Scraper
//!   ├── RemoteConsole::send_commands() ← one batch per cycle
//!   ├── parse_replies() → ParsedStatus
//!   ├── ExporterMetrics::record_status() → gauges
//!   ├── StatusBoard::record_status() → /status document
//!   └── run() → cycle, sleep(interval - elapsed), repeat
//!
//! HTTP
//!   ├── GET /metrics → Prometheus text exposition
//!   └── GET /status  → JSON status document
//! ```

pub mod http;
pub mod registry;
pub mod scraper;
pub mod status;

pub use http::build_router;
pub use registry::ExporterMetrics;
pub use scraper::{CycleOutcome, CycleReport, Scraper, next_delay};
pub use status::{StatusBoard, StatusDocument};
