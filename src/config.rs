use std::fs;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grade::Thresholds;
use crate::ping_executor::PROBE_TIMEOUT;

const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_PORT: u16 = 8080;

/// Command line flags. Anything given here overrides the config file.
#[derive(Parser, Debug, Default)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Comma-separated list of hosts to monitor
    #[arg(long, value_delimiter = ',', env = "NET_MONITOR_HOSTS")]
    pub hosts: Vec<String>,

    /// Port for the web server
    #[arg(long)]
    pub port: Option<u16>,

    /// Ping interval (e.g. 5s, 1m)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,

    /// Per-probe timeout (e.g. 3s, 500ms)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Path to a JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Redraw a stats table on the terminal
    #[arg(long)]
    pub live: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub hosts: Vec<String>,
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    #[serde(with = "humantime_serde")]
    pub probe_timeout: Duration,
    pub port: u16,
    pub good_latency_ms: f64,
    pub warning_latency_ms: f64,
}

impl Default for Config {
    fn default() -> Self {
        let thresholds = Thresholds::default();
        Self {
            hosts: Vec::new(),
            interval: DEFAULT_INTERVAL,
            probe_timeout: PROBE_TIMEOUT,
            port: DEFAULT_PORT,
            good_latency_ms: thresholds.good_latency_ms,
            warning_latency_ms: thresholds.warning_latency_ms,
        }
    }
}

impl Config {
    /// `<config dir>/NetMonitor/config.json`, if the platform has a config dir.
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("NetMonitor").join("config.json"))
    }

    /// Builds the effective configuration: defaults, then the config file,
    /// then command line flags.
    ///
    /// An explicit `--config` path must exist; the default path is only read
    /// when present.
    pub fn load(args: &Args) -> Result<Self> {
        let base = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => match Self::get_config_path().filter(|path| path.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        base.merge_args(args).validate()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn merge_args(mut self, args: &Args) -> Self {
        if !args.hosts.is_empty() {
            self.hosts.clone_from(&args.hosts);
        }
        if let Some(port) = args.port {
            self.port = port;
        }
        if let Some(interval) = args.interval {
            self.interval = interval;
        }
        if let Some(timeout) = args.timeout {
            self.probe_timeout = timeout;
        }
        self
    }

    /// Trims host names, drops empty entries and checks the remaining settings.
    pub fn validate(mut self) -> Result<Self> {
        self.hosts = self
            .hosts
            .iter()
            .map(|host| host.trim())
            .filter(|host| !host.is_empty())
            .map(str::to_string)
            .collect();

        if self.hosts.is_empty() {
            return Err(Error::NoHosts);
        }
        if self.interval.is_zero() {
            return Err(Error::InvalidDuration("interval"));
        }
        if self.probe_timeout.is_zero() {
            return Err(Error::InvalidDuration("probe timeout"));
        }
        if self.warning_latency_ms < self.good_latency_ms {
            return Err(Error::InvalidThresholds {
                good: self.good_latency_ms,
                warning: self.warning_latency_ms,
            });
        }

        Ok(self)
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            good_latency_ms: self.good_latency_ms,
            warning_latency_ms: self.warning_latency_ms,
        }
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(hosts: &[&str]) -> Args {
        Args {
            hosts: hosts.iter().map(|h| h.to_string()).collect(),
            ..Default::default()
        }
    }

    fn write_config(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_match_cli_defaults() {
        let config = Config::default().merge_args(&args(&["8.8.8.8"])).validate().unwrap();
        assert_eq!(config.interval, Duration::from_secs(5));
        assert_eq!(config.probe_timeout, Duration::from_secs(3));
        assert_eq!(config.port, 8080);
        assert_eq!(config.listen_addr().port(), 8080);
    }

    #[test]
    fn hosts_are_trimmed() {
        let config = Config::default()
            .merge_args(&args(&[" a.example", "", "b.example "]))
            .validate()
            .unwrap();
        assert_eq!(config.hosts, vec!["a.example", "b.example"]);
    }

    #[test]
    fn hosts_are_required() {
        assert!(matches!(Config::default().validate(), Err(Error::NoHosts)));
        let blank = Config::default().merge_args(&args(&[" ", ""])).validate();
        assert!(matches!(blank, Err(Error::NoHosts)));
    }

    #[test]
    fn zero_interval_rejected() {
        let mut cli = args(&["a"]);
        cli.interval = Some(Duration::ZERO);
        let result = Config::default().merge_args(&cli).validate();
        assert!(matches!(result, Err(Error::InvalidDuration("interval"))));
    }

    #[test]
    fn thresholds_must_be_ordered() {
        let config = Config {
            hosts: vec!["a".into()],
            good_latency_ms: 200.0,
            warning_latency_ms: 100.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidThresholds { .. })));
    }

    #[test]
    fn file_then_flags() {
        let file = write_config(
            r#"{ "hosts": ["file.example"], "interval": "30s", "port": 9000, "good_latency_ms": 20 }"#,
        );
        let cli = Args {
            config: Some(file.path().to_path_buf()),
            port: Some(9100),
            ..Default::default()
        };

        let config = Config::load(&cli).unwrap();
        assert_eq!(config.hosts, vec!["file.example"]);
        assert_eq!(config.interval, Duration::from_secs(30));
        assert_eq!(config.port, 9100);
        assert_eq!(config.thresholds().good_latency_ms, 20.0);
        assert_eq!(config.thresholds().warning_latency_ms, 100.0);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let cli = Args {
            config: Some(PathBuf::from("/nonexistent/net-monitor.json")),
            ..args(&["a"])
        };
        assert!(matches!(Config::load(&cli), Err(Error::ConfigRead { .. })));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let file = write_config("{ hosts: nope");
        let result = Config::from_file(file.path());
        assert!(matches!(result, Err(Error::ConfigParse { .. })));
    }

    #[test]
    fn parses_command_line() {
        let cli = Args::try_parse_from([
            "net-monitor",
            "--hosts",
            "8.8.8.8, 1.1.1.1",
            "--interval",
            "1m",
            "--timeout",
            "500ms",
            "--live",
        ])
        .unwrap();
        assert_eq!(cli.hosts, vec!["8.8.8.8", " 1.1.1.1"]);
        assert_eq!(cli.interval, Some(Duration::from_secs(60)));
        assert_eq!(cli.timeout, Some(Duration::from_millis(500)));
        assert!(cli.live);
    }
}
