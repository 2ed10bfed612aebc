// src/config.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub detector: DetectorConfig,
    pub calibration: CalibrationConfig,
    pub layout: LayoutConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// GET endpoint returning the current frame's detections.
    pub url: String,
    /// Whole-request timeout (ms); keeps the cycle cadence when the
    /// detector is unreachable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Fixed delay (ms) between cycles.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl DetectorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    pub path: PathBuf,
    /// Serve with an identity transform when the calibration file is
    /// missing or unreadable, instead of refusing to start. Off by default:
    /// an uncalibrated transform produces plausible-looking wrong occupancy.
    #[serde(default)]
    pub allow_identity_fallback: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_timeout_ms() -> u64 {
    1000
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        let config: Config =
            serde_yaml::from_str(&contents).context("malformed service configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config_parses() {
        let config: Config = serde_yaml::from_str(
            r#"
detector:
  url: http://127.0.0.1:5000/detections
  timeout_ms: 1500
  poll_interval_ms: 250
calibration:
  path: calibration.json
  allow_identity_fallback: true
layout:
  path: lot_layout.json
server:
  bind_addr: 127.0.0.1:9000
logging:
  level: debug
"#,
        )
        .unwrap();

        assert_eq!(config.detector.timeout(), Duration::from_millis(1500));
        assert_eq!(config.detector.poll_interval(), Duration::from_millis(250));
        assert!(config.calibration.allow_identity_fallback);
        assert_eq!(config.server.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn omitted_fields_take_defaults() {
        let config: Config = serde_yaml::from_str(
            r#"
detector:
  url: http://127.0.0.1:5000/detections
calibration:
  path: calibration.json
layout:
  path: lot_layout.json
server: {}
logging: {}
"#,
        )
        .unwrap();

        assert_eq!(config.detector.timeout(), Duration::from_millis(1000));
        assert_eq!(config.detector.poll_interval(), Duration::from_millis(500));
        assert!(!config.calibration.allow_identity_fallback);
        assert_eq!(config.server.bind_addr, "0.0.0.0:8000");
        assert_eq!(config.logging.level, "info");
    }
}
