use serde::{Deserialize, Serialize};

const LOSS_WARNING_PERCENT: f64 = 5.0;

/// Latency cut-offs used to grade a host, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub good_latency_ms: f64,
    pub warning_latency_ms: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            good_latency_ms: 50.0,
            warning_latency_ms: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    NoData,
    Good,
    Warning,
    Bad,
}

impl Grade {
    pub fn from_latency(latency_ms: Option<f64>, thresholds: &Thresholds) -> Self {
        match latency_ms {
            Some(time) if time < thresholds.good_latency_ms => Grade::Good,
            Some(time) if time < thresholds.warning_latency_ms => Grade::Warning,
            Some(_) => Grade::Bad,
            None => Grade::NoData,
        }
    }

    /// Grades cumulative packet loss. Nothing sent yet grades as `NoData`.
    pub fn from_loss(loss_percent: f64, packets_sent: u64) -> Self {
        if packets_sent == 0 {
            Grade::NoData
        } else if loss_percent == 0.0 {
            Grade::Good
        } else if loss_percent < LOSS_WARNING_PERCENT {
            Grade::Warning
        } else {
            Grade::Bad
        }
    }

    /// One-character marker shown next to a value in the text view.
    pub fn marker(self) -> char {
        match self {
            Grade::NoData => ' ',
            Grade::Good => '+',
            Grade::Warning => '~',
            Grade::Bad => '!',
        }
    }
}
