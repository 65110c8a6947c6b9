//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and almost every field is optional; anything left out falls
//! back to the values shipped in `config/default.toml`.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{DashError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub gauges: GaugesConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Telemetry listener configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound on how long shutdown can go unnoticed by the listener
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_handshake_timeout_ms")]
    pub handshake_timeout_ms: u64,

    /// Silence before a keepalive ping, and again before giving up on the peer
    #[serde(default = "default_keepalive_ms")]
    pub keepalive_ms: u64,
}

/// Window and render cadence configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DisplayConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_frame_period_ms")]
    pub frame_period_ms: u64,
}

/// Dial configuration for both gauges
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GaugesConfig {
    /// Speedometer, km/h
    #[serde(default = "default_speed_gauge")]
    pub speed: GaugeConfig,

    /// Tachometer, thousands of RPM
    #[serde(default = "default_rpm_gauge")]
    pub rpm: GaugeConfig,
}

/// A single dial
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GaugeConfig {
    pub max_value: f64,

    pub tick_interval: f64,

    /// Edge length of the square widget in points
    #[serde(default = "default_gauge_size")]
    pub size: f32,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily rolling log files; stderr only when unset
    #[serde(default)]
    pub directory: Option<String>,
}

// Default value functions
fn default_host() -> String { "localhost".to_string() }
fn default_port() -> u16 { 8765 }
fn default_poll_interval_ms() -> u64 { 100 }
fn default_handshake_timeout_ms() -> u64 { 5000 }
fn default_keepalive_ms() -> u64 { 20000 }

fn default_title() -> String { "TerraDrive Demo".to_string() }
fn default_frame_period_ms() -> u64 { 16 }

fn default_speed_gauge() -> GaugeConfig {
    GaugeConfig { max_value: 180.0, tick_interval: 20.0, size: default_gauge_size() }
}
fn default_rpm_gauge() -> GaugeConfig {
    GaugeConfig { max_value: 8.0, tick_interval: 1.0, size: default_gauge_size() }
}
fn default_gauge_size() -> f32 { 300.0 }

fn default_log_level() -> String { "info".to_string() }

/// Accepted values for `logging.level`
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            poll_interval_ms: default_poll_interval_ms(),
            handshake_timeout_ms: default_handshake_timeout_ms(),
            keepalive_ms: default_keepalive_ms(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            frame_period_ms: default_frame_period_ms(),
        }
    }
}

impl Default for GaugesConfig {
    fn default() -> Self {
        Self {
            speed: default_speed_gauge(),
            rpm: default_rpm_gauge(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

impl ServerConfig {
    /// URL the simulator should connect to, e.g. `ws://localhost:8765`
    pub fn url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use terradrive_dash::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(invalid("server host cannot be empty"));
        }

        if self.server.poll_interval_ms == 0 || self.server.poll_interval_ms > 100 {
            return Err(invalid("poll_interval_ms must be between 1 and 100"));
        }

        if self.server.handshake_timeout_ms == 0 || self.server.handshake_timeout_ms > 60000 {
            return Err(invalid("handshake_timeout_ms must be between 1 and 60000"));
        }

        if self.server.keepalive_ms == 0 || self.server.keepalive_ms > 600000 {
            return Err(invalid("keepalive_ms must be between 1 and 600000"));
        }

        if self.display.frame_period_ms == 0 || self.display.frame_period_ms > 1000 {
            return Err(invalid("frame_period_ms must be between 1 and 1000"));
        }

        for (name, gauge) in [("speed", &self.gauges.speed), ("rpm", &self.gauges.rpm)] {
            if !gauge.max_value.is_finite() || gauge.max_value <= 0.0 {
                return Err(invalid(format!("gauges.{} max_value must be greater than 0", name)));
            }

            if !gauge.tick_interval.is_finite()
                || gauge.tick_interval <= 0.0
                || gauge.tick_interval > gauge.max_value
            {
                return Err(invalid(format!(
                    "gauges.{} tick_interval must be greater than 0 and at most max_value",
                    name
                )));
            }

            if !(100.0..=1000.0).contains(&gauge.size) {
                return Err(invalid(format!("gauges.{} size must be between 100 and 1000", name)));
            }
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(invalid("logging level must be one of: trace, debug, info, warn, error"));
        }

        if matches!(&self.logging.directory, Some(dir) if dir.is_empty()) {
            return Err(invalid("logging directory cannot be empty when set"));
        }

        Ok(())
    }
}

fn invalid(msg: impl std::fmt::Display) -> DashError {
    DashError::Config(toml::de::Error::custom(msg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn load_str(toml_content: &str) -> Result<Config> {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        Config::load(temp_file.path())
    }

    #[test]
    fn test_default_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_load_empty_file_gives_defaults() {
        let config = load_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_config_from_file() {
        let config = load_str(
            r#"
[server]
host = "0.0.0.0"
port = 9000

[display]
title = "Cluster"

[gauges.speed]
max_value = 260
tick_interval = 20

[logging]
level = "debug"
"#,
        )
        .unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.poll_interval_ms, 100);
        assert_eq!(config.display.title, "Cluster");
        assert_eq!(config.display.frame_period_ms, 16);
        assert_eq!(config.gauges.speed.max_value, 260.0);
        assert_eq!(config.gauges.speed.size, 300.0);
        assert_eq!(config.gauges.rpm, default_rpm_gauge());
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_shipped_default_toml_matches_defaults() {
        let config = load_str(include_str!("../config/default.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/terradrive-dash.toml");
        assert!(matches!(result, Err(DashError::Io(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        assert!(matches!(load_str("[server\nport = "), Err(DashError::Config(_))));
    }

    #[test]
    fn test_gauge_section_requires_range() {
        assert!(load_str("[gauges.rpm]\nsize = 200\n").is_err());
    }

    #[test]
    fn test_empty_host() {
        let mut config = Config::default();
        config.server.host = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_poll_interval_zero() {
        let mut config = Config::default();
        config.server.poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_poll_interval_too_high() {
        let mut config = Config::default();
        config.server.poll_interval_ms = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_handshake_timeout_zero() {
        let mut config = Config::default();
        config.server.handshake_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_keepalive_out_of_range() {
        let mut config = Config::default();
        config.server.keepalive_ms = 0;
        assert!(config.validate().is_err());

        config.server.keepalive_ms = 600001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_frame_period_zero() {
        let mut config = Config::default();
        config.display.frame_period_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_frame_period_too_high() {
        let mut config = Config::default();
        config.display.frame_period_ms = 1001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_range_gauge() {
        let mut config = Config::default();
        config.gauges.speed.max_value = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_finite_gauge_range() {
        let mut config = Config::default();
        config.gauges.rpm.max_value = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tick_interval_zero() {
        let mut config = Config::default();
        config.gauges.rpm.tick_interval = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tick_interval_above_range() {
        let mut config = Config::default();
        config.gauges.speed.tick_interval = 200.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_gauge_size_out_of_range() {
        let mut config = Config::default();
        config.gauges.speed.size = 50.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_log_levels() {
        for level in LOG_LEVELS {
            let mut config = Config::default();
            config.logging.level = level.to_string();
            assert!(config.validate().is_ok(), "Log level {} should be valid", level);
        }
    }

    #[test]
    fn test_empty_log_directory() {
        let mut config = Config::default();
        config.logging.directory = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_server_url() {
        assert_eq!(ServerConfig::default().url(), "ws://localhost:8765");
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_host(), "localhost");
        assert_eq!(default_port(), 8765);
        assert_eq!(default_poll_interval_ms(), 100);
        assert_eq!(default_handshake_timeout_ms(), 5000);
        assert_eq!(default_keepalive_ms(), 20000);
        assert_eq!(default_title(), "TerraDrive Demo");
        assert_eq!(default_frame_period_ms(), 16);
        assert_eq!(default_speed_gauge().max_value, 180.0);
        assert_eq!(default_speed_gauge().tick_interval, 20.0);
        assert_eq!(default_rpm_gauge().max_value, 8.0);
        assert_eq!(default_rpm_gauge().tick_interval, 1.0);
        assert_eq!(default_gauge_size(), 300.0);
        assert_eq!(default_log_level(), "info");
    }
}
