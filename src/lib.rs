//! # TerraDrive Dash Library
//!
//! Live analog instrument cluster for the TerraDrive simulator.
//!
//! The simulator streams vehicle state as JSON over a WebSocket. The
//! ingestion channel ([`server`]) decodes each message into a
//! [`telemetry::TelemetrySnapshot`] and replaces the one held by the
//! [`telemetry::StateStore`]. Independently, the [`dashboard`] repaints the
//! gauges from the store on a fixed cadence. A single
//! [`shutdown::ShutdownSignal`] stops both.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod server;
pub mod shutdown;
pub mod telemetry;
