//! Observability for the scan layer
//!
//! - Structured JSON logging with a process-wide severity floor
//! - Typed lifecycle events
//! - Pool counters and per-scan diagnostics
//!
//! Observability is read-only: nothing here changes how a scan behaves.

mod events;
mod logger;
mod metrics;
mod scope;
mod stats;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{PoolMetrics, PoolMetricsSnapshot};
pub use scope::{ObservationScope, Timer};
pub use stats::ScanStats;

/// Log an event at its own severity.
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
