//! # Readouts
//!
//! Turns a snapshot into everything the dashboard draws for one frame:
//! needle positions, the gear and fuel annotations, and the three text
//! lines. Building a view has no side effects, so the same snapshot always
//! produces the same view.

use super::gauge::{Gauge, Needle};
use crate::config::GaugesConfig;
use crate::error::Result;
use crate::telemetry::{GeoPoint, Phase, TelemetrySnapshot};

/// m/s to km/h
const MPS_TO_KMH: f64 = 3.6;

/// Tachometer scale divisor (dial reads x1000 RPM)
const RPM_SCALE: f64 = 1000.0;

/// Speedometer value in km/h; direction is ignored
#[must_use]
pub fn speed_kmh(speed_mps: f64) -> f64 {
    (speed_mps * MPS_TO_KMH).abs()
}

/// Tachometer value in thousands of RPM
#[must_use]
pub fn rpm_thousands(rpm: f64) -> f64 {
    rpm / RPM_SCALE
}

/// Gear annotation: 0 is reverse, 1 neutral, N the (N-1)th forward gear.
///
/// # Examples
///
/// ```
/// use terradrive_dash::dashboard::readout::gear_text;
///
/// assert_eq!(gear_text(0), "R");
/// assert_eq!(gear_text(1), "N");
/// assert_eq!(gear_text(2), "1");
/// ```
#[must_use]
pub fn gear_text(gear: i64) -> String {
    match gear {
        0 => "R".to_string(),
        1 => "N".to_string(),
        n => n.saturating_sub(1).to_string(),
    }
}

/// Fuel annotation as a whole percentage
#[must_use]
pub fn fuel_text(fuel: f64) -> String {
    format!("{:.0}%", fuel * 100.0)
}

#[must_use]
pub fn position_text(position: GeoPoint, heading: f64) -> String {
    format!(
        "Pos: {:.6}° {:.6}° Heading: {:.1}°",
        position.lat, position.lon, heading
    )
}

#[must_use]
pub fn in_game_position_text(coords: [f64; 3]) -> String {
    format!("In game pos: {:.1} {:.1} {:.1}", coords[0], coords[1], coords[2])
}

#[must_use]
pub fn navigation_text(target: Option<GeoPoint>) -> String {
    match target {
        Some(point) => format!("Navigate to: {:.6}° {:.6}°", point.lat, point.lon),
        None => "Navigate to: None".to_string(),
    }
}

/// What one dial shows this frame
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeReading {
    pub needle: Needle,
    pub annotation: String,
}

/// Everything drawn for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub phase: Phase,
    pub tachometer: GaugeReading,
    pub speedometer: GaugeReading,
    pub position: String,
    pub in_game_position: String,
    pub navigation: String,
}

/// The two dials, built once from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    tachometer: Gauge,
    speedometer: Gauge,
}

impl Dashboard {
    /// # Errors
    ///
    /// Returns error if either gauge configuration is invalid
    pub fn new(config: &GaugesConfig) -> Result<Self> {
        Ok(Self {
            tachometer: Gauge::from_config(&config.rpm)?,
            speedometer: Gauge::from_config(&config.speed)?,
        })
    }

    pub fn tachometer(&self) -> &Gauge {
        &self.tachometer
    }

    pub fn speedometer(&self) -> &Gauge {
        &self.speedometer
    }

    /// Build the view for `snapshot`
    pub fn view(&self, snapshot: &TelemetrySnapshot, phase: Phase) -> DashboardView {
        DashboardView {
            phase,
            tachometer: GaugeReading {
                needle: self.tachometer.needle(rpm_thousands(snapshot.rpm)),
                annotation: gear_text(snapshot.gear),
            },
            speedometer: GaugeReading {
                needle: self.speedometer.needle(speed_kmh(snapshot.speed)),
                annotation: fuel_text(snapshot.fuel),
            },
            position: position_text(snapshot.position, snapshot.heading),
            in_game_position: in_game_position_text(snapshot.in_game_position),
            navigation: navigation_text(snapshot.navigation_point),
        }
    }
}
