//! Continuous reachability and latency monitoring for a fixed set of hosts.
//!
//! One [`Scheduler`] task per host probes on a fixed interval and feeds a
//! per-host [`HostStatsTracker`]. The [`StatsRegistry`] hands out consistent
//! per-host snapshots to the HTTP API and the terminal view.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod grade;
pub mod ping;
pub mod ping_executor;
pub mod registry;
pub mod scheduler;
pub mod stats;
pub mod view;

pub use config::{Args, Config};
pub use error::{Error, Result};
pub use grade::{Grade, Thresholds};
pub use ping::{ProbeError, ProbeOutcome};
pub use ping_executor::{PingExecutor, Prober, PROBE_TIMEOUT};
pub use registry::StatsRegistry;
pub use scheduler::Scheduler;
pub use stats::{HostStats, HostStatsTracker, HostStatus};
