//! # Gauge Geometry
//!
//! Maps dial values to needle angles and screen positions.
//!
//! ## Angle Convention
//!
//! Angles are radians in screen space (y grows downwards), so a growing
//! angle turns clockwise. The needle sweeps 240°: zero sits at -240°
//! (lower left) and `max_value` at 0° (pointing right).
//!
//! ```text
//!            -120°
//!         .---------.
//!       /             \
//!      |       +        |  0°  <- max_value
//!       \             /
//!   -240° '---------'
//!     ^ 0
//! ```
//!
//! All coordinates are local to the gauge's square widget, with the origin
//! at its top-left corner.

use crate::config::GaugeConfig;
use crate::error::{DashError, Result};

/// Needle sweep in degrees
pub const SWEEP_DEGREES: f64 = 240.0;

/// Angle of the zero mark in degrees
pub const START_DEGREES: f64 = -SWEEP_DEGREES;

/// Dial radius as a fraction of the widget size
const RADIUS_FRACTION: f64 = 0.4;

/// Tick marks span this band of the radius
const TICK_INNER: f64 = 0.9;
const TICK_OUTER: f64 = 1.0;

/// Tick label distance as a fraction of the radius
const LABEL_RADIUS: f64 = 0.75;

/// Needle length as a fraction of the radius
const NEEDLE_RADIUS: f64 = 0.85;

/// Most tick marks a single dial may carry
pub const MAX_TICKS: usize = 1000;

/// Point in gauge-local coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Map `value` onto the needle sweep.
///
/// `value` is clamped to `[0, max_value]` first, so the result always lies
/// in `[-240°, 0°]` (returned in radians). `max_value` must be positive,
/// which [`GaugeSpec::new`] guarantees.
///
/// # Examples
///
/// ```
/// use terradrive_dash::dashboard::gauge::value_to_angle;
///
/// assert_eq!(value_to_angle(0.0, 180.0), (-240.0f64).to_radians());
/// assert_eq!(value_to_angle(180.0, 180.0), 0.0);
/// assert_eq!(value_to_angle(300.0, 180.0), 0.0);
/// ```
#[must_use]
pub fn value_to_angle(value: f64, max_value: f64) -> f64 {
    // f64::max discards NaN, which parks the needle at zero
    let value = value.max(0.0).min(max_value);
    (START_DEGREES + SWEEP_DEGREES * (value / max_value)).to_radians()
}

/// Project a polar coordinate around `(center_x, center_y)`.
#[must_use]
pub fn polar_to_cartesian(center_x: f64, center_y: f64, radius: f64, angle: f64) -> Point {
    Point::new(center_x + radius * angle.cos(), center_y + radius * angle.sin())
}

/// Static description of one dial.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeSpec {
    max_value: f64,
    tick_interval: f64,
    radius: f64,
    center: Point,
}

impl GaugeSpec {
    /// Create a dial description.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::InvalidGauge`] if `max_value` or `tick_interval`
    /// is not a positive finite number, if the dial would need more than
    /// [`MAX_TICKS`] ticks, or if `radius` is not positive.
    pub fn new(max_value: f64, tick_interval: f64, radius: f64, center: Point) -> Result<Self> {
        if !max_value.is_finite() || max_value <= 0.0 {
            return Err(DashError::InvalidGauge(format!(
                "max_value must be positive, got {}",
                max_value
            )));
        }

        if !tick_interval.is_finite() || tick_interval <= 0.0 {
            return Err(DashError::InvalidGauge(format!(
                "tick_interval must be positive, got {}",
                tick_interval
            )));
        }

        if max_value / tick_interval >= MAX_TICKS as f64 {
            return Err(DashError::InvalidGauge(format!(
                "{} / {} needs more than {} ticks",
                max_value, tick_interval, MAX_TICKS
            )));
        }

        if !radius.is_finite() || radius <= 0.0 {
            return Err(DashError::InvalidGauge(format!(
                "radius must be positive, got {}",
                radius
            )));
        }

        Ok(Self { max_value, tick_interval, radius, center })
    }

    /// Dial for a square widget of `size`, using the standard proportions.
    ///
    /// # Errors
    ///
    /// Same as [`GaugeSpec::new`].
    pub fn from_config(config: &GaugeConfig) -> Result<Self> {
        let size = f64::from(config.size);
        let half = size / 2.0;
        Self::new(
            config.max_value,
            config.tick_interval,
            size * RADIUS_FRACTION,
            Point::new(half, half),
        )
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn center(&self) -> Point {
        self.center
    }

    /// Needle angle for `value` on this dial
    fn angle(&self, value: f64) -> f64 {
        value_to_angle(value, self.max_value)
    }

    /// Point at `fraction` of the radius along `angle`
    fn point_at(&self, fraction: f64, angle: f64) -> Point {
        polar_to_cartesian(self.center.x, self.center.y, self.radius * fraction, angle)
    }

    /// Tick values from 0 up to and including `max_value` when it lands on
    /// the interval.
    fn tick_values(&self) -> Vec<f64> {
        // Integer stepping avoids drift from repeated float addition
        let steps = (self.max_value / self.tick_interval + 1e-9).floor() as usize;
        (0..=steps).map(|i| i as f64 * self.tick_interval).collect()
    }
}

/// One precomputed tick mark with its label
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub inner: Point,
    pub outer: Point,
    pub label_pos: Point,
    pub label: String,
}

/// Needle position for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Needle {
    /// Radians, see the module docs
    pub angle: f64,
    pub tip: Point,
}

/// A dial with its static face geometry computed once.
#[derive(Debug, Clone, PartialEq)]
pub struct Gauge {
    spec: GaugeSpec,
    ticks: Vec<Tick>,
}

impl Gauge {
    #[must_use]
    pub fn new(spec: GaugeSpec) -> Self {
        let ticks = spec
            .tick_values()
            .into_iter()
            .map(|value| {
                let angle = spec.angle(value);
                Tick {
                    inner: spec.point_at(TICK_INNER, angle),
                    outer: spec.point_at(TICK_OUTER, angle),
                    label_pos: spec.point_at(LABEL_RADIUS, angle),
                    label: tick_label(value),
                }
            })
            .collect();

        Self { spec, ticks }
    }

    /// # Errors
    ///
    /// Returns error if the configuration describes an invalid dial
    pub fn from_config(config: &GaugeConfig) -> Result<Self> {
        Ok(Self::new(GaugeSpec::from_config(config)?))
    }

    pub fn spec(&self) -> &GaugeSpec {
        &self.spec
    }

    pub fn ticks(&self) -> &[Tick] {
        &self.ticks
    }

    /// Needle for `value`, clamped to the dial
    pub fn needle(&self, value: f64) -> Needle {
        let angle = self.spec.angle(value);
        Needle {
            angle,
            tip: self.spec.point_at(NEEDLE_RADIUS, angle),
        }
    }

    /// Where the annotation text (gear, fuel) is centred
    pub fn annotation_pos(&self) -> Point {
        let center = self.spec.center;
        let radius = self.spec.radius;
        Point::new(center.x + radius / 3.0, center.y + radius / 2.0)
    }
}

fn tick_label(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}
