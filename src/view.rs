use std::fmt::Write as _;
use std::io::Write as _;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::warn;
use tokio_util::sync::CancellationToken;

use crate::grade::{Grade, Thresholds};
use crate::registry::StatsRegistry;
use crate::stats::HostStats;

/// How often the terminal view is redrawn.
pub const REFRESH_PERIOD: Duration = Duration::from_secs(2);

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

pub fn format_latency(latency_ms: Option<f64>) -> String {
    match latency_ms {
        Some(ms) => format!("{ms:.2} ms"),
        None => "N/A".to_string(),
    }
}

pub fn format_last_seen(last_seen: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(last_seen) = last_seen else {
        return "Never".to_string();
    };

    let secs = (now - last_seen).num_seconds().max(0);
    if secs < 60 {
        format!("{secs}s ago")
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}

fn graded(value: String, grade: Grade) -> String {
    format!("{value}{}", grade.marker())
}

/// Renders one line per host as a fixed-width table.
pub fn render_table(stats: &[HostStats], thresholds: &Thresholds, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<24} {:<8} {:>11} {:>11} {:>21} {:>10} {:>9} {:>11} {:>8}  {}",
        "HOST", "STATUS", "CURRENT", "AVG", "MIN / MAX", "JITTER", "LOSS", "SENT/RECV", "UPTIME",
        "LAST SEEN"
    );

    for host in stats {
        let current = graded(
            format_latency(host.current_latency),
            Grade::from_latency(host.current_latency, thresholds),
        );
        let avg = graded(
            format_latency(host.average_latency()),
            Grade::from_latency(host.average_latency(), thresholds),
        );
        let min_max = format!(
            "{} / {}",
            format_latency(host.min_latency),
            format_latency(host.max_latency)
        );
        let loss = graded(
            format!("{:.2}%", host.packet_loss_percent),
            Grade::from_loss(host.packet_loss_percent, host.packets_sent),
        );
        let sent_recv = format!("{}/{}", host.packets_sent, host.packets_received);

        let _ = writeln!(
            out,
            "{:<24} {:<8} {:>11} {:>11} {:>21} {:>10} {:>9} {:>11} {:>7.1}%  {}",
            host.host,
            host.status,
            current,
            avg,
            min_max,
            format!("{:.2} ms", host.jitter),
            loss,
            sent_recv,
            host.uptime_percent(),
            format_last_seen(host.last_seen, now),
        );
    }

    let _ = writeln!(out, "\nLast updated: {}", now.format("%H:%M:%S"));
    out
}

/// Redraws the table on stdout until `shutdown_token` is cancelled.
pub async fn run_live(
    registry: StatsRegistry,
    thresholds: Thresholds,
    shutdown_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(REFRESH_PERIOD);

    loop {
        tokio::select! {
            biased;
            () = shutdown_token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let table = render_table(&registry.snapshot(), &thresholds, Utc::now());
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = write!(stdout, "{CLEAR_SCREEN}{table}").and_then(|()| stdout.flush()) {
            warn!("live view stopped: {e}");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ping::ProbeOutcome;
    use crate::stats::HostStatsTracker;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn last_seen_is_relative() {
        let now = at(0);
        assert_eq!(format_last_seen(None, now), "Never");
        assert_eq!(format_last_seen(Some(at(-12)), now), "12s ago");
        assert_eq!(format_last_seen(Some(at(-185)), now), "3m ago");
        assert_eq!(format_last_seen(Some(at(-7_300)), now), "2h ago");
        assert_eq!(format_last_seen(Some(at(5)), now), "0s ago");
    }

    #[test]
    fn latency_without_data_is_na() {
        assert_eq!(format_latency(None), "N/A");
        assert_eq!(format_latency(Some(3.14159)), "3.14 ms");
    }

    #[test]
    fn table_lists_every_host() {
        let up = HostStatsTracker::new("up.example");
        up.apply_at(ProbeOutcome::success(20.0), at(-3));
        let down = HostStatsTracker::new("down.example");
        down.apply(ProbeOutcome::Failure);
        let fresh = HostStatsTracker::new("fresh.example");

        let stats = vec![up.snapshot(), down.snapshot(), fresh.snapshot()];
        let table = render_table(&stats, &Thresholds::default(), at(0));

        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[0].starts_with("HOST"));
        assert!(lines[1].starts_with("up.example"));
        assert!(lines[1].contains("20.00 ms+"));
        assert!(lines[1].contains("3s ago"));
        assert!(lines[2].contains("down"));
        assert!(lines[2].contains("100.00%!"));
        assert!(lines[3].contains("unknown"));
        assert!(lines[3].contains("Never"));
        assert!(lines[3].contains("N/A"));
    }
}
