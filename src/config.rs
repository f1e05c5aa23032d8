//! # Configuration Management
//!
//! This module holds every fixed parameter of the agent as a compiled
//! default, optionally overridable from a relay-config.toml file. The file
//! is a development convenience: its absence (the normal case) leaves the
//! defaults untouched, and an invalid file falls back to defaults with a
//! warning rather than failing startup.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Application configuration loaded from relay-config.toml
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Remote collector endpoint configuration
    pub collector: CollectorConfig,
    /// Synthetic waveform parameters
    pub waveform: WaveformConfig,
    /// Alert thresholds applied to each reading
    pub alerts: AlertConfig,
    /// Loop cadence, dwell times, and reconnect policy
    pub timing: TimingConfig,
    /// Character display geometry
    pub display: DisplayConfig,
}

/// Remote HTTP collector configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CollectorConfig {
    /// Full endpoint URL receiving telemetry POSTs
    pub endpoint: String,
    /// Group identifier echoed in every payload
    pub group_id: i64,
    /// Bound on a single POST, seconds
    pub request_timeout_secs: u64,
}

/// Parameters of the triangular temperature/humidity cycle
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WaveformConfig {
    /// Values at the start and end of each cycle
    pub baseline_temperature: f32,
    pub baseline_humidity: f32,
    /// Values at the 50% point of each cycle
    pub peak_temperature: f32,
    pub peak_humidity: f32,
    /// One full rise-then-fall period, seconds
    pub cycle_period_secs: u64,
}

/// Fixed alert thresholds (strictly above raises the flag)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AlertConfig {
    pub high_temperature: f32,
    pub high_humidity: f32,
}

/// Cadence and reconnect policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimingConfig {
    /// Main loop polling interval, seconds
    pub tick_secs: u64,
    /// How long the send-success view stays up, milliseconds
    pub success_dwell_ms: u64,
    /// How long the send-failure view stays up, milliseconds
    pub failure_dwell_ms: u64,
    /// Dwell after a per-tick reconnect attempt, milliseconds
    pub reconnect_dwell_ms: u64,
    /// Bounded attempts during the startup gate
    pub startup_attempts: u32,
    /// Wait between bounded startup attempts, seconds
    pub startup_retry_secs: u64,
    /// Wait between unbounded startup retries after the gate fails, seconds
    pub startup_fallback_secs: u64,
    /// Bounded wait inside one reconnect attempt, seconds
    pub reconnect_wait_secs: u64,
    /// Bound on one link probe, seconds
    pub probe_timeout_secs: u64,
}

/// Two-line character display geometry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Columns per line (16x2 target form factor)
    pub columns: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            collector: CollectorConfig {
                endpoint: "http://192.168.0.237:5000/iot-data".to_string(),
                group_id: 1,
                request_timeout_secs: 10,
            },
            waveform: WaveformConfig {
                baseline_temperature: 25.0,
                baseline_humidity: 50.0,
                peak_temperature: 70.0,
                peak_humidity: 75.0,
                cycle_period_secs: 120,
            },
            alerts: AlertConfig {
                high_temperature: 70.0,
                high_humidity: 70.0,
            },
            timing: TimingConfig {
                tick_secs: 5,
                success_dwell_ms: 1500,
                failure_dwell_ms: 2000,
                reconnect_dwell_ms: 1000,
                startup_attempts: 15,
                startup_retry_secs: 1,
                startup_fallback_secs: 10,
                reconnect_wait_secs: 2,
                probe_timeout_secs: 3,
            },
            display: DisplayConfig { columns: 16 },
        }
    }
}

impl Config {
    /// Load configuration from relay-config.toml
    /// Falls back to the compiled defaults if the file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path("relay-config.toml")
    }

    /// Load configuration from specified path
    /// Falls back to the compiled defaults if the file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    log::info!("loaded configuration override from {:?}", path.as_ref());
                    config
                }
                Err(e) => {
                    log::warn!("invalid config file format: {}", e);
                    log::warn!("using compiled defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.timing.tick_secs)
    }

    pub fn cycle_period(&self) -> Duration {
        Duration::from_secs(self.waveform.cycle_period_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.collector.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.collector.group_id, 1);
        assert_eq!(config.collector.request_timeout_secs, 10);
        assert_eq!(config.waveform.cycle_period_secs, 120);
        assert_eq!(config.waveform.baseline_temperature, 25.0);
        assert_eq!(config.waveform.peak_humidity, 75.0);
        assert_eq!(config.timing.tick_secs, 5);
        assert_eq!(config.timing.startup_attempts, 15);
        assert_eq!(config.display.columns, 16);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.collector.endpoint, parsed.collector.endpoint);
        assert_eq!(config.waveform.cycle_period_secs, parsed.waveform.cycle_period_secs);
        assert_eq!(config.timing.success_dwell_ms, parsed.timing.success_dwell_ms);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        // Should fallback to defaults
        assert_eq!(config.collector.group_id, 1);
    }

    #[test]
    fn test_load_invalid_file_falls_back() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml [[[").unwrap();
        let config = Config::load_from_path(file.path());
        assert_eq!(config.waveform.cycle_period_secs, 120);
    }

    #[test]
    fn test_load_override_file() {
        let mut file = NamedTempFile::new().unwrap();
        let contents = toml::to_string(&Config {
            collector: CollectorConfig {
                endpoint: "http://10.0.0.2:8080/ingest".to_string(),
                group_id: 7,
                request_timeout_secs: 4,
            },
            ..Config::default()
        })
        .unwrap();
        file.write_all(contents.as_bytes()).unwrap();

        let config = Config::load_from_path(file.path());
        assert_eq!(config.collector.endpoint, "http://10.0.0.2:8080/ingest");
        assert_eq!(config.collector.group_id, 7);
        // Untouched sections keep their values
        assert_eq!(config.timing.tick_secs, 5);
    }
}
