//! # Error Types
//!
//! Custom error types for TerraDrive Dash using `thiserror`.

use thiserror::Error;

/// Main error type for TerraDrive Dash
#[derive(Debug, Error)]
pub enum DashError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Inbound message is not a telemetry record
    #[error("Malformed telemetry message: {0}")]
    MalformedMessage(String),

    /// JSON decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Gauge cannot be constructed from the given parameters
    #[error("Invalid gauge configuration: {0}")]
    InvalidGauge(String),

    /// Window / rendering backend errors
    #[error("GUI error: {0}")]
    Gui(String),
}

/// Result type alias for TerraDrive Dash
pub type Result<T> = std::result::Result<T, DashError>;
