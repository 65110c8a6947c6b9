//! # Telemetry Snapshot
//!
//! The decoded vehicle state and its wire representation.
//!
//! ## Wire Format
//!
//! Each WebSocket message is one JSON object; every key is optional and
//! unknown keys are ignored.
//!
//! | Key | Type | Default | Meaning |
//! |-----|------|---------|---------|
//! | `speed` | number | 0 | m/s, signed |
//! | `rpm` | number | 0 | engine revolutions per minute |
//! | `gear` | integer | 1 | 0 = reverse, 1 = neutral, N ≥ 2 = gear N-1 |
//! | `fuel` | number | 0.5 | tank fraction 0..1 |
//! | `pos` | `{lat, lon}` | `{0, 0}` | degrees |
//! | `heading` | number | 0 | degrees |
//! | `inGamePos` | `[x, y, z]` | `[0, 0, 0]` | engine-local coordinates |
//! | `navPoint` | `{lat, lon}` | none | active destination |
//!
//! The long names `position`, `inGamePosition` and `navigationPoint` are
//! accepted too; when a message carries both spellings the short one wins.
//! A JSON `null` counts as absent.
//!
//! ## Usage
//!
//! ```
//! use terradrive_dash::telemetry::snapshot::{decode_snapshot, TelemetrySnapshot};
//!
//! let snapshot = decode_snapshot(r#"{"speed": 12.5, "gear": 3}"#)?;
//! assert_eq!(snapshot.speed, 12.5);
//! assert_eq!(snapshot.gear, 3);
//! assert_eq!(snapshot.fuel, TelemetrySnapshot::default().fuel);
//! # Ok::<(), terradrive_dash::error::DashError>(())
//! ```

use serde::Deserialize;

use crate::error::{DashError, Result};

/// Default gear on the wire (neutral)
pub const DEFAULT_GEAR: i64 = 1;

/// Default fuel fraction
pub const DEFAULT_FUEL: f64 = 0.5;

/// Geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// One complete vehicle state.
///
/// All fields are resolved at decode time, so readers never deal with
/// missing values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySnapshot {
    /// Signed speed in m/s
    pub speed: f64,

    /// Engine RPM
    pub rpm: f64,

    /// Raw gear index (0 = R, 1 = N, N = gear N-1)
    pub gear: i64,

    /// Fuel fraction, nominally 0..1
    pub fuel: f64,

    pub position: GeoPoint,

    /// Heading in degrees
    pub heading: f64,

    /// Engine-local coordinates
    pub in_game_position: [f64; 3],

    /// Active navigation target, `None` when no destination is set
    pub navigation_point: Option<GeoPoint>,
}

impl Default for TelemetrySnapshot {
    fn default() -> Self {
        Self {
            speed: 0.0,
            rpm: 0.0,
            gear: DEFAULT_GEAR,
            fuel: DEFAULT_FUEL,
            position: GeoPoint::default(),
            heading: 0.0,
            in_game_position: [0.0; 3],
            navigation_point: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct WireSnapshot {
    speed: Option<f64>,
    rpm: Option<f64>,
    gear: Option<i64>,
    fuel: Option<f64>,
    pos: Option<WireGeoPoint>,
    position: Option<WireGeoPoint>,
    heading: Option<f64>,
    in_game_pos: Option<[f64; 3]>,
    in_game_position: Option<[f64; 3]>,
    nav_point: Option<WireGeoPoint>,
    navigation_point: Option<WireGeoPoint>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireGeoPoint {
    lat: Option<f64>,
    lon: Option<f64>,
}

impl WireGeoPoint {
    fn is_empty(&self) -> bool {
        self.lat.is_none() && self.lon.is_none()
    }

    fn resolve(self) -> GeoPoint {
        GeoPoint {
            lat: self.lat.unwrap_or_default(),
            lon: self.lon.unwrap_or_default(),
        }
    }
}

impl From<WireSnapshot> for TelemetrySnapshot {
    fn from(wire: WireSnapshot) -> Self {
        let defaults = TelemetrySnapshot::default();

        Self {
            speed: wire.speed.unwrap_or(defaults.speed),
            rpm: wire.rpm.unwrap_or(defaults.rpm),
            gear: wire.gear.unwrap_or(defaults.gear),
            fuel: wire.fuel.unwrap_or(defaults.fuel),
            position: wire
                .pos
                .or(wire.position)
                .map_or(defaults.position, WireGeoPoint::resolve),
            heading: wire.heading.unwrap_or(defaults.heading),
            in_game_position: wire
                .in_game_pos
                .or(wire.in_game_position)
                .unwrap_or(defaults.in_game_position),
            // `{}` carries no destination
            navigation_point: wire
                .nav_point
                .or(wire.navigation_point)
                .filter(|point| !point.is_empty())
                .map(WireGeoPoint::resolve),
        }
    }
}

/// Decode one inbound message into a fully-defaulted snapshot.
///
/// # Errors
///
/// Returns error if the payload is not JSON, is not a JSON object, or a
/// known key carries a value of the wrong type. Nothing is partially
/// applied in that case.
pub fn decode_snapshot(payload: &str) -> Result<TelemetrySnapshot> {
    let value: serde_json::Value = serde_json::from_str(payload)?;
    if !value.is_object() {
        return Err(DashError::MalformedMessage(format!(
            "expected a JSON object, got {}",
            json_kind(&value)
        )));
    }

    let wire: WireSnapshot = serde_json::from_value(value)?;
    Ok(wire.into())
}

/// Decode a binary frame, which must hold UTF-8 JSON.
///
/// # Errors
///
/// Same as [`decode_snapshot`], plus invalid UTF-8.
pub fn decode_snapshot_bytes(payload: &[u8]) -> Result<TelemetrySnapshot> {
    let text = std::str::from_utf8(payload)
        .map_err(|e| DashError::MalformedMessage(format!("binary frame is not UTF-8: {}", e)))?;
    decode_snapshot(text)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
