//! Error handling for PathSim
//!
//! Provides the error taxonomy of the simulation pipeline:
//! - Structural errors (a path with nothing to drive through)
//! - Constraint errors (non-positive kinematic limits)
//! - Rebuild errors (a background rebuild that never produced a result)
//!
//! Zero-length segments are not errors. They are kept in the segment chain,
//! flagged as degenerate and crossed instantaneously.
//!
//! All error types use `thiserror` for ergonomic error handling.

use std::fmt;
use thiserror::Error;

/// Kinematic field that carried an invalid value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintField {
    /// Translational velocity limit (m/s)
    MaxVelocity,
    /// Translational acceleration limit (m/s²)
    MaxAcceleration,
    /// Corner handoff radius (m)
    HandoffRadius,
    /// Turn rate limit (rad/s)
    MaxAngularVelocity,
}

impl fmt::Display for ConstraintField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxVelocity => write!(f, "maxVelocity"),
            Self::MaxAcceleration => write!(f, "maxAcceleration"),
            Self::HandoffRadius => write!(f, "handoffRadius"),
            Self::MaxAngularVelocity => write!(f, "maxAngularVelocity"),
        }
    }
}

/// Where an invalid constraint value was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintLocation {
    /// Path element at this index
    Element(usize),
    /// Ranged constraint at this index
    Ranged(usize),
    /// Resolved segment at this index (value came from configuration)
    Segment(usize),
    /// Simulation config default
    Config,
}

impl fmt::Display for ConstraintLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(index) => write!(f, "element {}", index),
            Self::Ranged(index) => write!(f, "ranged constraint {}", index),
            Self::Segment(index) => write!(f, "segment {}", index),
            Self::Config => write!(f, "config defaults"),
        }
    }
}

/// Simulation error type
///
/// Every variant is recoverable: a failed rebuild leaves the previously
/// committed timeline in place.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// The path contains no position-bearing element
    #[error("Path has no position-bearing elements")]
    EmptyPath,

    /// A kinematic limit is zero, negative or not finite
    #[error("Invalid {field} on {location}: {value} (must be positive)")]
    InvalidConstraint {
        /// Where the value was found.
        location: ConstraintLocation,
        /// The offending field.
        field: ConstraintField,
        /// The rejected value.
        value: f64,
    },

    /// A background rebuild terminated without a result
    #[error("Rebuild aborted: {reason}")]
    RebuildAborted {
        /// Why the rebuild task did not complete.
        reason: String,
    },
}

impl SimulationError {
    /// Create an invalid constraint error
    pub fn invalid_constraint(location: ConstraintLocation, field: ConstraintField, value: f64) -> Self {
        SimulationError::InvalidConstraint {
            location,
            field,
            value,
        }
    }

    /// Check if this is an empty path error
    pub fn is_empty_path(&self) -> bool {
        matches!(self, SimulationError::EmptyPath)
    }

    /// Check if this is a constraint error
    pub fn is_invalid_constraint(&self) -> bool {
        matches!(self, SimulationError::InvalidConstraint { .. })
    }
}

/// Result type using SimulationError
pub type SimulationResult<T> = std::result::Result<T, SimulationError>;

/// Returns `Some(value)` unless it is missing, or an error when it is not a
/// positive finite number.
pub fn require_positive(
    value: Option<f64>,
    location: ConstraintLocation,
    field: ConstraintField,
) -> SimulationResult<Option<f64>> {
    match value {
        Some(v) if !(v.is_finite() && v > 0.0) => {
            Err(SimulationError::invalid_constraint(location, field, v))
        }
        other => Ok(other),
    }
}
