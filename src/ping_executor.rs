use std::net::IpAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use surge_ping::{Client, Config, ICMP, IcmpPacket, PingIdentifier, PingSequence, SurgeError};

use crate::ping::{ProbeError, ProbeOutcome};

/// Default bound on a single probe, name resolution included.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

const PAYLOAD: [u8; 32] = [0; 32];

static NEXT_IDENTIFIER: AtomicU16 = AtomicU16::new(1);

/// Sends one reachability probe to a host.
///
/// Implementations must be safe to call concurrently for different hosts and
/// must never panic on network errors; every failure is a
/// [`ProbeOutcome::Failure`].
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, host: &str) -> ProbeOutcome;
}

/// Validates a host name for lookup, stripping an optional `:port` suffix.
/// Returns None instead of rewriting names with characters DNS cannot carry,
/// so a probe never lands on a different host than the one configured.
fn hostname_for_lookup(hostname: &str) -> Option<&str> {
    let hostname = hostname.trim();
    // Also handle case where user included port like "example.com:8080"
    let hostname = match hostname.split_once(':') {
        Some((name, port)) if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => {
            name
        }
        Some(_) => return None,
        None => hostname,
    };

    let valid = !hostname.is_empty()
        && hostname
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_'));

    valid.then_some(hostname)
}

/// Bounds a whole probe attempt, resolution included, by `timeout`.
async fn bounded<F>(timeout: Duration, attempt: F) -> Result<f64, ProbeError>
where
    F: Future<Output = Result<f64, ProbeError>>,
{
    tokio::time::timeout(timeout, attempt)
        .await
        .map_err(|_| ProbeError::Timeout)?
}

/// ICMP echo prober backed by `surge-ping`.
///
/// Every probe resolves the host again and opens its own client, so nothing
/// is shared between concurrent probes.
#[derive(Debug, Clone)]
pub struct PingExecutor {
    timeout: Duration,
}

impl Default for PingExecutor {
    fn default() -> Self {
        Self::new(PROBE_TIMEOUT)
    }
}

impl PingExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolves the host and pings it once, keeping the failure cause.
    pub async fn resolve_and_ping(&self, target: &str) -> Result<f64, ProbeError> {
        let attempt = async {
            let target_ip = Self::resolve_target(target).await?;
            self.execute_ping(target_ip).await
        };

        bounded(self.timeout, attempt).await
    }

    /// Resolve hostname to IP address
    async fn resolve_target(target: &str) -> Result<IpAddr, ProbeError> {
        // Try parsing as IP address first
        if let Ok(ip) = target.parse::<IpAddr>() {
            return Ok(ip);
        }

        let hostname =
            hostname_for_lookup(target).ok_or_else(|| ProbeError::Resolve(target.to_string()))?;

        tokio::net::lookup_host((hostname, 0u16))
            .await
            .ok()
            .and_then(|mut addrs| addrs.next())
            .map(|addr| addr.ip())
            .ok_or_else(|| ProbeError::Resolve(target.to_string()))
    }

    /// Execute the actual ping operation
    async fn execute_ping(&self, target_ip: IpAddr) -> Result<f64, ProbeError> {
        let config = match target_ip {
            IpAddr::V4(_) => Config::default(),
            IpAddr::V6(_) => Config::builder().kind(ICMP::V6).build(),
        };
        let client = Client::new(&config).map_err(ProbeError::Transport)?;

        let identifier = NEXT_IDENTIFIER.fetch_add(1, Ordering::Relaxed);
        let mut pinger = client.pinger(target_ip, PingIdentifier(identifier)).await;
        pinger.timeout(self.timeout);

        match pinger.ping(PingSequence(1), &PAYLOAD).await {
            Ok((IcmpPacket::V4(_), duration)) | Ok((IcmpPacket::V6(_), duration)) => {
                Ok(duration.as_secs_f64() * 1000.0)
            }
            Err(SurgeError::Timeout { .. }) => Err(ProbeError::Timeout),
            Err(e) => Err(ProbeError::Network(e.to_string())),
        }
    }
}

#[async_trait]
impl Prober for PingExecutor {
    async fn probe(&self, host: &str) -> ProbeOutcome {
        let result = self.resolve_and_ping(host).await;
        match &result {
            Ok(ms) => debug!("{host}: reply in {ms:.2} ms"),
            Err(e) => debug!("{host}: probe failed: {e}"),
        }
        result.into()
    }
}
