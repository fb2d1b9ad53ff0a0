use std::fmt;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::ping::{ProbeOutcome, clamp_round_trip};

/// Exponential smoothing weights for jitter: old value, new sample.
const JITTER_DECAY: f64 = 0.9;
const JITTER_GAIN: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostStatus {
    /// No probe has completed yet.
    #[default]
    Unknown,
    Up,
    Down,
}

impl HostStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HostStatus::Unknown => "unknown",
            HostStatus::Up => "up",
            HostStatus::Down => "down",
        }
    }
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Aggregate statistics for one monitored host since startup.
///
/// Latency fields are in milliseconds. `None` means no successful probe has
/// been seen yet; `avg_latency` stays `0.0` until then.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostStats {
    pub host: String,
    pub status: HostStatus,
    pub last_seen: Option<DateTime<Utc>>,
    pub packets_sent: u64,
    #[serde(rename = "packetsRecv")]
    pub packets_received: u64,
    #[serde(rename = "packetLoss")]
    pub packet_loss_percent: f64,
    pub avg_latency: f64,
    pub min_latency: Option<f64>,
    pub max_latency: Option<f64>,
    /// Last successful round trip; kept while the host is down.
    pub current_latency: Option<f64>,
    pub jitter: f64,
}

impl HostStats {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            status: HostStatus::Unknown,
            last_seen: None,
            packets_sent: 0,
            packets_received: 0,
            packet_loss_percent: 0.0,
            avg_latency: 0.0,
            min_latency: None,
            max_latency: None,
            current_latency: None,
            jitter: 0.0,
        }
    }

    /// Share of probes answered, in percent. Zero before the first probe.
    pub fn uptime_percent(&self) -> f64 {
        if self.packets_sent == 0 {
            0.0
        } else {
            100.0 - self.packet_loss_percent
        }
    }

    /// Mean round trip, or `None` before the first reply.
    pub fn average_latency(&self) -> Option<f64> {
        (self.packets_received > 0).then_some(self.avg_latency)
    }

    pub fn packets_lost(&self) -> u64 {
        self.packets_sent - self.packets_received
    }

    fn record_success(&mut self, rtt: f64, now: DateTime<Utc>, previous: Option<f64>) {
        self.status = HostStatus::Up;
        self.packets_received += 1;
        self.last_seen = Some(now);
        self.current_latency = Some(rtt);

        if self.min_latency.is_none_or(|min| rtt < min) {
            self.min_latency = Some(rtt);
        }
        if self.max_latency.is_none_or(|max| rtt > max) {
            self.max_latency = Some(rtt);
        }

        let n = self.packets_received as f64;
        self.avg_latency = if self.packets_received == 1 {
            rtt
        } else {
            (self.avg_latency * (n - 1.0) + rtt) / n
        };

        if let Some(previous) = previous {
            let delta = (rtt - previous).abs();
            self.jitter = self.jitter * JITTER_DECAY + delta * JITTER_GAIN;
        }
    }

    fn recompute_loss(&mut self) {
        self.packet_loss_percent = if self.packets_sent == 0 {
            0.0
        } else {
            self.packets_lost() as f64 / self.packets_sent as f64 * 100.0
        };
    }
}

#[derive(Debug)]
struct TrackerState {
    stats: HostStats,
    /// Baseline for the next jitter sample. Cleared by a failed probe.
    previous_latency: Option<f64>,
}

/// Owns one host's [`HostStats`] and applies probe outcomes to it.
///
/// Every update happens under a single write lock, so readers always see the
/// stats either before or after a whole outcome has been applied.
#[derive(Debug)]
pub struct HostStatsTracker {
    host: String,
    state: RwLock<TrackerState>,
}

impl HostStatsTracker {
    pub fn new(host: impl Into<String>) -> Self {
        let host = host.into();
        Self {
            state: RwLock::new(TrackerState {
                stats: HostStats::new(host.clone()),
                previous_latency: None,
            }),
            host,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Applies one probe outcome and returns the status the host had before it.
    pub fn apply(&self, outcome: ProbeOutcome) -> HostStatus {
        self.apply_at(outcome, Utc::now())
    }

    /// Same as [`apply`](Self::apply) with an explicit timestamp for `last_seen`.
    pub fn apply_at(&self, outcome: ProbeOutcome, now: DateTime<Utc>) -> HostStatus {
        let mut state = self.state.write();
        let before = state.stats.status;

        state.stats.packets_sent += 1;
        match outcome {
            ProbeOutcome::Success { round_trip_ms } => {
                let round_trip_ms = clamp_round_trip(round_trip_ms);
                let previous = state.previous_latency.replace(round_trip_ms);
                state.stats.record_success(round_trip_ms, now, previous);
            }
            ProbeOutcome::Failure => {
                state.stats.status = HostStatus::Down;
                state.previous_latency = None;
            }
        }
        state.stats.recompute_loss();

        before
    }

    /// Copy of the stats as of the last completed update.
    pub fn snapshot(&self) -> HostStats {
        self.state.read().stats.clone()
    }
}
