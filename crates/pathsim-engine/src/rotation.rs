//! Heading interpolation over arc length.
//!
//! Heading depends on where the robot is along the path, never on when it gets
//! there. Between two anchors the heading turns the short way round in
//! proportion to arc-length progress; anchors sharing an arc length snap.

use crate::profile::VelocityProfile;
use crate::segments::{HeadingAnchor, SegmentChain, DEGENERATE_LENGTH};
use crate::timeline::AngularRateWarning;
use pathsim_core::{lerp_angle, shortest_angular_distance, wrap_angle};

/// Turns smaller than this are not checked against the rate limit (rad)
const TURN_EPSILON: f64 = 1e-9;

/// Maps arc length to heading.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationInterpolator {
    anchors: Vec<HeadingAnchor>,
    fallback: f64,
}

impl RotationInterpolator {
    /// Creates an interpolator; `fallback` is used only when `anchors` is empty.
    pub fn new(mut anchors: Vec<HeadingAnchor>, fallback: f64) -> Self {
        anchors.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Self {
            anchors,
            fallback: wrap_angle(fallback),
        }
    }

    pub fn from_chain(chain: &SegmentChain) -> Self {
        Self::new(chain.heading_anchors().to_vec(), chain.fallback_heading())
    }

    pub fn anchors(&self) -> &[HeadingAnchor] {
        &self.anchors
    }

    /// Heading at arc length `s`, wrapped into (-π, π].
    pub fn heading_at(&self, s: f64) -> f64 {
        let (Some(first), Some(last)) = (self.anchors.first(), self.anchors.last()) else {
            return self.fallback;
        };

        let next = self.anchors.partition_point(|a| a.distance <= s);
        if next == 0 {
            return wrap_angle(first.heading);
        }
        if next == self.anchors.len() {
            return wrap_angle(last.heading);
        }

        let from = &self.anchors[next - 1];
        let to = &self.anchors[next];
        let ratio = (s - from.distance) / (to.distance - from.distance);
        lerp_angle(from.heading, to.heading, ratio)
    }

    /// Transitions whose turn rate under `profile` exceeds the limit of the
    /// anchor being turned towards.
    ///
    /// Anchors sharing an arc length snap and are never reported.
    pub fn angular_rate_warnings(&self, profile: &VelocityProfile) -> Vec<AngularRateWarning> {
        self.anchors
            .windows(2)
            .filter_map(|pair| {
                let (from, to) = (&pair[0], &pair[1]);
                if to.distance - from.distance <= DEGENERATE_LENGTH {
                    return None;
                }
                let turn = shortest_angular_distance(from.heading, to.heading).abs();
                if turn < TURN_EPSILON {
                    return None;
                }

                let elapsed = profile.time_at(to.distance) - profile.time_at(from.distance);
                if elapsed <= 0.0 {
                    return None;
                }
                let required = turn / elapsed;
                (required > to.max_angular_velocity).then_some(AngularRateWarning {
                    anchor: to.element_index,
                    required,
                    limit: to.max_angular_velocity,
                })
            })
            .collect()
    }
}
