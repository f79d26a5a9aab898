//! Path model
//!
//! The ordered element sequence authored in the editor. Element order defines
//! adjacency and direction of travel. Positions are meters, headings radians,
//! limits SI units.
//!
//! The model is validated structurally by the editor before it reaches the
//! simulation; kinematic limits are checked when the path is resolved into
//! segments.

use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// A position the robot drives through
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationTarget {
    pub position: Point,
    /// Velocity limit while driving towards this target (m/s)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_velocity: Option<f64>,
    /// Acceleration limit while driving towards this target (m/s²)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_acceleration: Option<f64>,
    /// Radius of the slowdown window around this corner (m)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handoff_radius: Option<f64>,
}

impl TranslationTarget {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            max_velocity: None,
            max_acceleration: None,
            handoff_radius: None,
        }
    }

    pub fn with_max_velocity(mut self, max_velocity: f64) -> Self {
        self.max_velocity = Some(max_velocity);
        self
    }

    pub fn with_max_acceleration(mut self, max_acceleration: f64) -> Self {
        self.max_acceleration = Some(max_acceleration);
        self
    }

    pub fn with_handoff_radius(mut self, radius: f64) -> Self {
        self.handoff_radius = Some(radius);
        self
    }
}

/// A heading to reach part way along the enclosing segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationTarget {
    pub heading: f64,
    /// Fractional position along the enclosing segment, in [0, 1]
    pub t_ratio: f64,
    /// Soft turn-rate limit (rad/s)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_angular_velocity: Option<f64>,
}

impl RotationTarget {
    /// Creates a rotation target; `t_ratio` is clamped into [0, 1].
    pub fn new(heading: f64, t_ratio: f64) -> Self {
        Self {
            heading,
            t_ratio: t_ratio.clamp(0.0, 1.0),
            max_angular_velocity: None,
        }
    }

    pub fn with_max_angular_velocity(mut self, max_angular_velocity: f64) -> Self {
        self.max_angular_velocity = Some(max_angular_velocity);
        self
    }
}

/// A position with a pinned heading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    #[serde(flatten)]
    pub translation: TranslationTarget,
    pub heading: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_angular_velocity: Option<f64>,
}

impl Waypoint {
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self {
            translation: TranslationTarget::new(x, y),
            heading,
            max_angular_velocity: None,
        }
    }

    pub fn with_translation(mut self, translation: TranslationTarget) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_max_angular_velocity(mut self, max_angular_velocity: f64) -> Self {
        self.max_angular_velocity = Some(max_angular_velocity);
        self
    }
}

/// One authored path element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PathElement {
    Translation(TranslationTarget),
    Rotation(RotationTarget),
    Waypoint(Waypoint),
}

impl PathElement {
    /// Returns the element kind name.
    pub fn kind_name(&self) -> &'static str {
        match self {
            PathElement::Translation(_) => "translation",
            PathElement::Rotation(_) => "rotation",
            PathElement::Waypoint(_) => "waypoint",
        }
    }

    /// Translation part of a translation target or waypoint.
    pub fn translation(&self) -> Option<&TranslationTarget> {
        match self {
            PathElement::Translation(target) => Some(target),
            PathElement::Waypoint(waypoint) => Some(&waypoint.translation),
            PathElement::Rotation(_) => None,
        }
    }

    pub fn position(&self) -> Option<Point> {
        self.translation().map(|t| t.position)
    }

    pub fn is_position_bearing(&self) -> bool {
        self.translation().is_some()
    }
}

impl From<TranslationTarget> for PathElement {
    fn from(target: TranslationTarget) -> Self {
        PathElement::Translation(target)
    }
}

impl From<RotationTarget> for PathElement {
    fn from(target: RotationTarget) -> Self {
        PathElement::Rotation(target)
    }
}

impl From<Waypoint> for PathElement {
    fn from(waypoint: Waypoint) -> Self {
        PathElement::Waypoint(waypoint)
    }
}

/// Kinematic field a ranged constraint overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RangedConstraintKind {
    MaxVelocity,
    MaxAcceleration,
}

/// A limit applied to a run of segments
///
/// Ordinals count position-bearing elements starting at 1; the range is
/// inclusive. A segment is covered when the ordinal of the element it ends at
/// lies in the range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangedConstraint {
    pub kind: RangedConstraintKind,
    pub value: f64,
    pub start_ordinal: usize,
    pub end_ordinal: usize,
}

impl RangedConstraint {
    pub fn new(kind: RangedConstraintKind, value: f64, start_ordinal: usize, end_ordinal: usize) -> Self {
        Self {
            kind,
            value,
            start_ordinal,
            end_ordinal,
        }
    }

    pub fn covers(&self, ordinal: usize) -> bool {
        self.start_ordinal <= ordinal && ordinal <= self.end_ordinal
    }
}

/// An authored path
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Path {
    pub elements: Vec<PathElement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ranged_constraints: Vec<RangedConstraint>,
}

impl Path {
    /// Creates a new empty path.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_elements(elements: impl IntoIterator<Item = PathElement>) -> Self {
        Self {
            elements: elements.into_iter().collect(),
            ranged_constraints: Vec::new(),
        }
    }

    /// Appends an element, builder style.
    pub fn with(mut self, element: impl Into<PathElement>) -> Self {
        self.elements.push(element.into());
        self
    }

    pub fn with_ranged_constraint(mut self, constraint: RangedConstraint) -> Self {
        self.ranged_constraints.push(constraint);
        self
    }

    pub fn push(&mut self, element: impl Into<PathElement>) {
        self.elements.push(element.into());
    }

    pub fn get_element(&self, index: usize) -> Option<&PathElement> {
        self.elements.get(index)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of elements that carry a position.
    pub fn position_count(&self) -> usize {
        self.elements.iter().filter(|e| e.is_position_bearing()).count()
    }
}
