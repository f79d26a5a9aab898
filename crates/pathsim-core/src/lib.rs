//! # PathSim Core
//!
//! Core types shared by the PathSim crates: the authored path model,
//! planar geometry helpers and the simulation error taxonomy.

pub mod error;
pub mod geometry;
pub mod model;

pub use error::{
    require_positive, ConstraintField, ConstraintLocation, SimulationError, SimulationResult,
};
pub use geometry::{lerp_angle, shortest_angular_distance, wrap_angle, Point};
pub use model::{
    Path, PathElement, RangedConstraint, RangedConstraintKind, RotationTarget, TranslationTarget,
    Waypoint,
};
