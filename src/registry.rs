use std::collections::HashMap;
use std::sync::Arc;

use crate::stats::{HostStats, HostStatsTracker};

/// Fixed set of per-host trackers, built once at startup.
///
/// Membership never changes after construction; only the trackers' contents
/// do. There is no registry-wide lock: each tracker guards its own stats.
#[derive(Debug, Clone, Default)]
pub struct StatsRegistry {
    trackers: Arc<HashMap<String, Arc<HostStatsTracker>>>,
    order: Arc<[String]>,
}

impl StatsRegistry {
    /// Builds one tracker per distinct host identifier. Repeated identical
    /// strings share a tracker; different spellings of the same address do not.
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut trackers = HashMap::new();
        let mut order = Vec::new();

        for host in hosts {
            let host = host.into();
            if trackers.contains_key(&host) {
                continue;
            }
            trackers.insert(host.clone(), Arc::new(HostStatsTracker::new(host.clone())));
            order.push(host);
        }

        Self {
            trackers: Arc::new(trackers),
            order: order.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn tracker(&self, host: &str) -> Option<Arc<HostStatsTracker>> {
        self.trackers.get(host).cloned()
    }

    /// Iterates trackers in configured order.
    pub fn trackers(&self) -> impl Iterator<Item = &Arc<HostStatsTracker>> {
        self.order.iter().filter_map(|host| self.trackers.get(host))
    }

    pub fn get(&self, host: &str) -> Option<HostStats> {
        self.trackers.get(host).map(|tracker| tracker.snapshot())
    }

    /// Current stats for every host.
    ///
    /// Each entry is consistent on its own; entries for different hosts may be
    /// taken at slightly different instants. Callers must not rely on the order.
    pub fn snapshot(&self) -> Vec<HostStats> {
        self.trackers().map(|tracker| tracker.snapshot()).collect()
    }
}
