use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can stop the monitor from starting or serving.
///
/// Probe failures are deliberately absent: they are reported as
/// [`ProbeOutcome::Failure`](crate::ping::ProbeOutcome::Failure) and never
/// escape a host's polling loop.
#[derive(Debug, Error)]
pub enum Error {
    /// No host identifiers were configured.
    #[error("at least one host must be configured (use --hosts a,b,c)")]
    NoHosts,

    /// A duration setting was zero.
    #[error("{0} must be greater than zero")]
    InvalidDuration(&'static str),

    /// Latency thresholds are out of order.
    #[error("warning latency threshold ({warning} ms) is below the good threshold ({good} ms)")]
    InvalidThresholds { good: f64, warning: f64 },

    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for [`Config`](crate::config::Config).
    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The HTTP listener could not be bound.
    #[error("failed to bind to address: {0}")]
    Bind(#[source] std::io::Error),

    /// The HTTP server stopped with an error.
    #[error("http server failed: {0}")]
    Serve(#[source] std::io::Error),

    /// The scheduler has already been started.
    #[error("the scheduler has already been started")]
    AlreadyStarted,
}
