use std::fmt;

use thiserror::Error;

/// Result of a single probe attempt against one host.
///
/// Produced by a [`Prober`](crate::ping_executor::Prober) and consumed right
/// away by a [`HostStatsTracker`](crate::stats::HostStatsTracker).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeOutcome {
    Success { round_trip_ms: f64 },
    Failure,
}

impl ProbeOutcome {
    /// Negative or non-finite round trips are clamped to zero.
    pub fn success(round_trip_ms: f64) -> Self {
        Self::Success {
            round_trip_ms: clamp_round_trip(round_trip_ms),
        }
    }

    pub fn failure() -> Self {
        Self::Failure
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn round_trip_ms(&self) -> Option<f64> {
        match self {
            Self::Success { round_trip_ms } => Some(*round_trip_ms),
            Self::Failure => None,
        }
    }
}

/// Maps negative and non-finite round trips to zero.
pub(crate) fn clamp_round_trip(round_trip_ms: f64) -> f64 {
    if round_trip_ms.is_finite() && round_trip_ms > 0.0 {
        round_trip_ms
    } else {
        0.0
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { round_trip_ms } => write!(f, "reply in {round_trip_ms:.2} ms"),
            Self::Failure => f.write_str("no reply"),
        }
    }
}

/// Why a probe failed. Only used for logging; every variant folds into
/// [`ProbeOutcome::Failure`].
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("could not resolve {0}")]
    Resolve(String),

    #[error("could not open ICMP socket: {0}")]
    Transport(#[source] std::io::Error),

    #[error("timed out waiting for reply")]
    Timeout,

    #[error("send/receive failed: {0}")]
    Network(String),
}

impl From<Result<f64, ProbeError>> for ProbeOutcome {
    fn from(result: Result<f64, ProbeError>) -> Self {
        match result {
            Ok(round_trip_ms) => Self::success(round_trip_ms),
            Err(_) => Self::failure(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_clamps_bad_values() {
        assert_eq!(ProbeOutcome::success(-3.0).round_trip_ms(), Some(0.0));
        assert_eq!(ProbeOutcome::success(f64::NAN).round_trip_ms(), Some(0.0));
        assert_eq!(ProbeOutcome::success(12.5).round_trip_ms(), Some(12.5));
    }

    #[test]
    fn errors_fold_into_failure() {
        let outcome: ProbeOutcome = Err::<f64, _>(ProbeError::Timeout).into();
        assert_eq!(outcome, ProbeOutcome::Failure);
        assert!(!outcome.is_success());
        assert_eq!(outcome.round_trip_ms(), None);
    }
}
