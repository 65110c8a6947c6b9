//! # Telemetry Module
//!
//! Vehicle state as received from the simulator.
//!
//! This module handles:
//! - Decoding JSON telemetry messages into snapshots
//! - Substituting documented defaults for missing fields
//! - Holding the latest snapshot for the dashboard

pub mod snapshot;
pub mod store;

pub use snapshot::{decode_snapshot, GeoPoint, TelemetrySnapshot};
pub use store::{Phase, StateStore};
