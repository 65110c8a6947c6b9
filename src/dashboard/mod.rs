//! # Dashboard Module
//!
//! Analog instrument cluster: tachometer, speedometer and text readouts.
//!
//! This module handles:
//! - Dial geometry (value to angle, polar to screen coordinates)
//! - Static tick marks computed once per gauge
//! - Gear, fuel, position and navigation annotations
//! - The fixed-cadence render loop

pub mod app;
pub mod gauge;
pub mod readout;

pub use app::{DashboardApp, RepaintHandle};
pub use gauge::{polar_to_cartesian, value_to_angle, Gauge, GaugeSpec};
pub use readout::{Dashboard, DashboardView};
