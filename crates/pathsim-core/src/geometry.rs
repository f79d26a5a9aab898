//! Planar geometry utilities
//!
//! Field coordinates are meters, headings are radians measured
//! counter-clockwise from the +X axis and normalized into (-π, π].

use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use std::fmt;

/// A position on the field in meters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Direction of travel from `self` towards `other`
    pub fn direction_to(&self, other: &Point) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Linear interpolation, `ratio` 0 is `self` and 1 is `other`
    pub fn lerp(&self, other: &Point, ratio: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * ratio,
            y: self.y + (other.y - self.y) * ratio,
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// Normalize an angle into (-π, π]
///
/// * `theta` - Angle in radians, any magnitude
pub fn wrap_angle(theta: f64) -> f64 {
    if theta > -PI && theta <= PI {
        return theta;
    }
    let wrapped = (theta + PI).rem_euclid(TAU) - PI;
    // rem_euclid maps +π onto -π; keep the closed upper bound instead
    if wrapped <= -PI {
        PI
    } else {
        wrapped
    }
}

/// Signed turn that takes `from` onto `to` along the shorter direction
///
/// * `from` - Current heading in radians
/// * `to` - Target heading in radians
pub fn shortest_angular_distance(from: f64, to: f64) -> f64 {
    wrap_angle(to - from)
}

/// Interpolate between two headings along the shorter direction
///
/// * `from` - Heading at `ratio` 0
/// * `to` - Heading at `ratio` 1
/// * `ratio` - Fractional progress, clamped to [0, 1]
pub fn lerp_angle(from: f64, to: f64, ratio: f64) -> f64 {
    let ratio = ratio.clamp(0.0, 1.0);
    wrap_angle(from + shortest_angular_distance(from, to) * ratio)
}
