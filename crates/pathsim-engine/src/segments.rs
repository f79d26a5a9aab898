//! Segment chain resolution.
//!
//! Turns an authored [`Path`] into straight segments with concrete kinematic
//! limits, the ordered heading anchors and the corner slowdown windows the
//! profiler and interpolator consume.

use pathsim_core::{
    require_positive, shortest_angular_distance, ConstraintField, ConstraintLocation, Path,
    PathElement, Point, RangedConstraintKind, SimulationError, SimulationResult,
    TranslationTarget,
};
use pathsim_settings::SimulationConfig;
use tracing::debug;

/// Segments shorter than this are treated as zero length.
pub const DEGENERATE_LENGTH: f64 = 1e-9;

/// A straight run between two consecutive position-bearing elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
    pub length: f64,
    /// Arc length at which this segment starts
    pub start_distance: f64,
    pub max_velocity: f64,
    pub max_acceleration: f64,
    /// Index of the element this segment drives towards
    pub element_index: usize,
}

impl Segment {
    /// Creates a new segment starting at `start_distance` along the path.
    pub fn new(
        start: Point,
        end: Point,
        start_distance: f64,
        max_velocity: f64,
        max_acceleration: f64,
        element_index: usize,
    ) -> Self {
        Self {
            start,
            end,
            length: start.distance_to(&end),
            start_distance,
            max_velocity,
            max_acceleration,
            element_index,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.length < DEGENERATE_LENGTH
    }

    pub fn end_distance(&self) -> f64 {
        self.start_distance + self.length
    }

    /// Direction of travel, `None` for a degenerate segment.
    pub fn direction(&self) -> Option<f64> {
        (!self.is_degenerate()).then(|| self.start.direction_to(&self.end))
    }

    /// Point at `local` meters from the segment start.
    pub fn point_at(&self, local: f64) -> Point {
        if self.is_degenerate() {
            return self.end;
        }
        self.start.lerp(&self.end, (local / self.length).clamp(0.0, 1.0))
    }
}

/// A position-bearing element placed on the arc-length axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionAnchor {
    pub element_index: usize,
    pub position: Point,
    pub distance: f64,
}

/// A heading the robot must hold at a given arc length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingAnchor {
    pub element_index: usize,
    pub distance: f64,
    pub heading: f64,
    /// Resolved turn-rate limit for reaching this anchor (rad/s)
    pub max_angular_velocity: f64,
}

/// Velocity reduction around an interior corner.
///
/// The cap is `corner_velocity` at the corner and rises linearly to
/// `approach_velocity` at the window edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerWindow {
    pub element_index: usize,
    pub center: f64,
    pub radius: f64,
    pub corner_velocity: f64,
    pub approach_velocity: f64,
}

impl CornerWindow {
    pub fn start(&self) -> f64 {
        self.center - self.radius
    }

    pub fn end(&self) -> f64 {
        self.center + self.radius
    }

    pub fn contains(&self, s: f64) -> bool {
        (s - self.center).abs() <= self.radius
    }

    /// Velocity cap at `s`, infinite outside the window.
    pub fn cap_at(&self, s: f64) -> f64 {
        if !self.contains(s) {
            return f64::INFINITY;
        }
        let ratio = (s - self.center).abs() / self.radius;
        self.corner_velocity + (self.approach_velocity - self.corner_velocity) * ratio
    }
}

/// The resolved path: segments, anchors and corner windows.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentChain {
    segments: Vec<Segment>,
    positions: Vec<PositionAnchor>,
    heading_anchors: Vec<HeadingAnchor>,
    corner_windows: Vec<CornerWindow>,
    total_length: f64,
}

impl SegmentChain {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn positions(&self) -> &[PositionAnchor] {
        &self.positions
    }

    /// Heading anchors in arc-length order
    pub fn heading_anchors(&self) -> &[HeadingAnchor] {
        &self.heading_anchors
    }

    pub fn corner_windows(&self) -> &[CornerWindow] {
        &self.corner_windows
    }

    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    /// Arc lengths of every position-bearing element.
    pub fn anchor_positions(&self) -> impl Iterator<Item = f64> + '_ {
        self.positions.iter().map(|p| p.distance)
    }

    /// Heading used when the path has no heading anchors: the direction of the
    /// first segment with nonzero length, or 0.
    pub fn fallback_heading(&self) -> f64 {
        self.segments
            .iter()
            .find_map(Segment::direction)
            .unwrap_or(0.0)
    }

    /// Position at arc length `s`, clamped to the path extent.
    pub fn position_at(&self, s: f64) -> Point {
        if self.segments.is_empty() {
            return self.positions[0].position;
        }
        let index = self
            .segments
            .partition_point(|seg| seg.end_distance() < s)
            .min(self.segments.len() - 1);
        let segment = &self.segments[index];
        segment.point_at(s - segment.start_distance)
    }
}

/// Resolves a [`Path`] into a [`SegmentChain`].
pub struct SegmentBuilder {
    default_max_velocity: f64,
    default_max_acceleration: f64,
    default_max_angular_velocity: f64,
    default_handoff_radius: f64,
}

impl SegmentBuilder {
    /// Creates a builder that fills unset limits from `config`.
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            default_max_velocity: config.default_max_velocity,
            default_max_acceleration: config.default_max_acceleration,
            default_max_angular_velocity: config.default_max_angular_velocity,
            default_handoff_radius: config.default_handoff_radius,
        }
    }

    /// Builds the segment chain.
    ///
    /// # Errors
    /// * `EmptyPath` - no element carries a position
    /// * `InvalidConstraint` - an element or ranged constraint carries a
    ///   non-positive limit
    pub fn build(&self, path: &Path) -> SimulationResult<SegmentChain> {
        validate_limits(path)?;

        let targets: Vec<(usize, &TranslationTarget)> = path
            .elements
            .iter()
            .enumerate()
            .filter_map(|(index, element)| element.translation().map(|t| (index, t)))
            .collect();
        if targets.is_empty() {
            return Err(SimulationError::EmptyPath);
        }

        let mut segments = Vec::with_capacity(targets.len() - 1);
        let mut positions = Vec::with_capacity(targets.len());
        let mut distance = 0.0;
        positions.push(PositionAnchor {
            element_index: targets[0].0,
            position: targets[0].1.position,
            distance,
        });

        for (k, pair) in targets.windows(2).enumerate() {
            let (_, from) = pair[0];
            let (element_index, to) = pair[1];
            // ordinals are 1-based over position-bearing elements
            let ordinal = k + 2;

            let max_velocity = to
                .max_velocity
                .or_else(|| ranged_value(path, RangedConstraintKind::MaxVelocity, ordinal))
                .unwrap_or(self.default_max_velocity);
            let max_acceleration = to
                .max_acceleration
                .or_else(|| ranged_value(path, RangedConstraintKind::MaxAcceleration, ordinal))
                .unwrap_or(self.default_max_acceleration);

            let segment = Segment::new(
                from.position,
                to.position,
                distance,
                max_velocity,
                max_acceleration,
                element_index,
            );
            if segment.is_degenerate() {
                debug!(
                    "Segment {} towards element {} is degenerate at {}",
                    k, element_index, to.position
                );
            }
            distance = segment.end_distance();
            positions.push(PositionAnchor {
                element_index,
                position: to.position,
                distance,
            });
            segments.push(segment);
        }

        let heading_anchors = self.resolve_heading_anchors(path, &segments, distance);
        let corner_windows = self.resolve_corner_windows(&targets, &segments);

        debug!(
            "Resolved {} segments ({} degenerate), {} heading anchors, {} corner windows, length {:.3} m",
            segments.len(),
            segments.iter().filter(|s| s.is_degenerate()).count(),
            heading_anchors.len(),
            corner_windows.len(),
            distance
        );

        Ok(SegmentChain {
            segments,
            positions,
            heading_anchors,
            corner_windows,
            total_length: distance,
        })
    }

    fn resolve_heading_anchors(
        &self,
        path: &Path,
        segments: &[Segment],
        total_length: f64,
    ) -> Vec<HeadingAnchor> {
        let mut anchors = Vec::new();
        let mut positions_seen = 0usize;

        for (element_index, element) in path.elements.iter().enumerate() {
            match element {
                PathElement::Translation(_) => positions_seen += 1,
                PathElement::Waypoint(waypoint) => {
                    let distance = match positions_seen {
                        0 => 0.0,
                        n => segments[n - 1].end_distance(),
                    };
                    anchors.push(HeadingAnchor {
                        element_index,
                        distance,
                        heading: waypoint.heading,
                        max_angular_velocity: waypoint
                            .max_angular_velocity
                            .unwrap_or(self.default_max_angular_velocity),
                    });
                    positions_seen += 1;
                }
                PathElement::Rotation(rotation) => {
                    let distance = if positions_seen == 0 {
                        0.0
                    } else if positions_seen > segments.len() {
                        total_length
                    } else {
                        let segment = &segments[positions_seen - 1];
                        segment.start_distance + rotation.t_ratio.clamp(0.0, 1.0) * segment.length
                    };
                    anchors.push(HeadingAnchor {
                        element_index,
                        distance,
                        heading: rotation.heading,
                        max_angular_velocity: rotation
                            .max_angular_velocity
                            .unwrap_or(self.default_max_angular_velocity),
                    });
                }
            }
        }

        // stable: anchors at the same arc length keep authored order
        anchors.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        anchors
    }

    fn resolve_corner_windows(
        &self,
        targets: &[(usize, &TranslationTarget)],
        segments: &[Segment],
    ) -> Vec<CornerWindow> {
        let mut windows = Vec::new();

        for j in 1..segments.len() {
            let (element_index, target) = targets[j];
            let incoming = &segments[j - 1];
            let outgoing = &segments[j];
            let (Some(dir_in), Some(dir_out)) = (incoming.direction(), outgoing.direction()) else {
                continue;
            };

            let radius = target
                .handoff_radius
                .unwrap_or(self.default_handoff_radius)
                .min(0.5 * incoming.length.min(outgoing.length));
            if radius.is_nan() || radius <= 0.0 {
                continue;
            }

            let turn = shortest_angular_distance(dir_in, dir_out).abs();
            let approach_velocity = incoming.max_velocity.min(outgoing.max_velocity);
            let corner_velocity = approach_velocity * (turn / 2.0).cos().max(0.0);
            if corner_velocity >= approach_velocity {
                continue;
            }

            windows.push(CornerWindow {
                element_index,
                center: incoming.end_distance(),
                radius,
                corner_velocity,
                approach_velocity,
            });
        }

        windows
    }
}

/// Last matching ranged constraint of `kind` covering `ordinal`.
fn ranged_value(path: &Path, kind: RangedConstraintKind, ordinal: usize) -> Option<f64> {
    path.ranged_constraints
        .iter()
        .rev()
        .find(|rc| rc.kind == kind && rc.covers(ordinal))
        .map(|rc| rc.value)
}

fn validate_limits(path: &Path) -> SimulationResult<()> {
    for (index, element) in path.elements.iter().enumerate() {
        let location = ConstraintLocation::Element(index);
        if let Some(target) = element.translation() {
            require_positive(target.max_velocity, location, ConstraintField::MaxVelocity)?;
            require_positive(target.max_acceleration, location, ConstraintField::MaxAcceleration)?;
            require_positive(target.handoff_radius, location, ConstraintField::HandoffRadius)?;
        }
        let angular = match element {
            PathElement::Rotation(rotation) => rotation.max_angular_velocity,
            PathElement::Waypoint(waypoint) => waypoint.max_angular_velocity,
            PathElement::Translation(_) => None,
        };
        require_positive(angular, location, ConstraintField::MaxAngularVelocity)?;
    }

    for (index, rc) in path.ranged_constraints.iter().enumerate() {
        let field = match rc.kind {
            RangedConstraintKind::MaxVelocity => ConstraintField::MaxVelocity,
            RangedConstraintKind::MaxAcceleration => ConstraintField::MaxAcceleration,
        };
        require_positive(Some(rc.value), ConstraintLocation::Ranged(index), field)?;
    }

    Ok(())
}
