//! Velocity profiling.
//!
//! Computes v(s) over the whole segment chain with a two-pass limited profile
//! and integrates it into t(s). Both passes run over a shared grid in arc
//! length that contains every segment boundary and corner window edge.

use crate::segments::{CornerWindow, Segment, SegmentChain};
use pathsim_core::{
    require_positive, ConstraintField, ConstraintLocation, SimulationResult,
};
use tracing::debug;

/// Maximum grid spacing in arc length (m)
pub const PROFILE_STEP: f64 = 0.02;

/// Velocity floor at interior grid points (m/s)
pub const V_EPSILON: f64 = 1e-3;

/// Merge tolerance for grid breakpoints (m)
const BREAKPOINT_EPSILON: f64 = 1e-12;

/// Velocity and time over arc length.
///
/// Between grid points acceleration is constant, so every query inverts the
/// same kinematics the times were integrated with.
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityProfile {
    distances: Vec<f64>,
    velocities: Vec<f64>,
    times: Vec<f64>,
}

impl VelocityProfile {
    /// Total travel time (s)
    pub fn duration(&self) -> f64 {
        self.times.last().copied().unwrap_or(0.0)
    }

    pub fn total_length(&self) -> f64 {
        self.distances.last().copied().unwrap_or(0.0)
    }

    /// Grid arc lengths
    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Velocity at each grid point
    pub fn velocities(&self) -> &[f64] {
        &self.velocities
    }

    /// Time at each grid point
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Time at which arc length `s` is reached.
    pub fn time_at(&self, s: f64) -> f64 {
        if self.distances.len() < 2 || s <= 0.0 {
            return 0.0;
        }
        if s >= self.total_length() {
            return self.duration();
        }

        let i = self.interval_by(&self.distances, s);
        let (s0, s1) = (self.distances[i], self.distances[i + 1]);
        let (v0, v1) = (self.velocities[i], self.velocities[i + 1]);
        let d = s - s0;
        let ds = s1 - s0;
        if ds <= 0.0 {
            return self.times[i];
        }

        let accel = (v1 * v1 - v0 * v0) / (2.0 * ds);
        let v = (v0 * v0 + 2.0 * accel * d).max(0.0).sqrt();
        let mean = 0.5 * (v0 + v);
        let dt = if mean > 0.0 {
            d / mean
        } else {
            (self.times[i + 1] - self.times[i]) * d / ds
        };
        (self.times[i] + dt).min(self.times[i + 1])
    }

    /// Arc length reached at time `t`.
    pub fn distance_at(&self, t: f64) -> f64 {
        if self.times.len() < 2 || t <= 0.0 {
            return 0.0;
        }
        if t >= self.duration() {
            return self.total_length();
        }

        let i = self.interval_by(&self.times, t);
        let (tau, dt, v0, accel) = self.interval_kinematics(i, t);
        let ds = self.distances[i + 1] - self.distances[i];
        if dt <= 0.0 {
            return self.distances[i];
        }
        self.distances[i] + (v0 * tau + 0.5 * accel * tau * tau).clamp(0.0, ds)
    }

    /// Velocity at time `t`.
    pub fn velocity_at(&self, t: f64) -> f64 {
        if self.times.len() < 2 || t <= 0.0 || t >= self.duration() {
            return if t <= 0.0 {
                self.velocities.first().copied().unwrap_or(0.0)
            } else {
                self.velocities.last().copied().unwrap_or(0.0)
            };
        }

        let i = self.interval_by(&self.times, t);
        let (tau, _, v0, accel) = self.interval_kinematics(i, t);
        let v1 = self.velocities[i + 1];
        (v0 + accel * tau).clamp(v0.min(v1), v0.max(v1))
    }

    /// Index `i` of the grid interval `[keys[i], keys[i + 1])` holding `value`.
    fn interval_by(&self, keys: &[f64], value: f64) -> usize {
        keys.partition_point(|&k| k <= value)
            .saturating_sub(1)
            .min(keys.len() - 2)
    }

    /// (elapsed time in interval, interval duration, start velocity, acceleration)
    fn interval_kinematics(&self, i: usize, t: f64) -> (f64, f64, f64, f64) {
        let dt = self.times[i + 1] - self.times[i];
        let v0 = self.velocities[i];
        let accel = if dt > 0.0 {
            (self.velocities[i + 1] - v0) / dt
        } else {
            0.0
        };
        ((t - self.times[i]).clamp(0.0, dt.max(0.0)), dt, v0, accel)
    }
}

/// Two-pass velocity profiler.
#[derive(Debug, Clone)]
pub struct MotionProfiler {
    step: f64,
}

impl Default for MotionProfiler {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionProfiler {
    pub fn new() -> Self {
        Self { step: PROFILE_STEP }
    }

    /// Profiler with a custom grid spacing; non-positive values fall back to
    /// [`PROFILE_STEP`].
    pub fn with_step(step: f64) -> Self {
        let step = if step.is_finite() && step > 0.0 {
            step
        } else {
            PROFILE_STEP
        };
        Self { step }
    }

    /// Profiles the chain from rest to rest.
    ///
    /// # Errors
    /// `InvalidConstraint` when a segment carries a non-positive velocity or
    /// acceleration limit. Limits are never adjusted here.
    pub fn profile(&self, chain: &SegmentChain) -> SimulationResult<VelocityProfile> {
        for (index, segment) in chain.segments().iter().enumerate() {
            let location = ConstraintLocation::Segment(index);
            require_positive(Some(segment.max_velocity), location, ConstraintField::MaxVelocity)?;
            require_positive(
                Some(segment.max_acceleration),
                location,
                ConstraintField::MaxAcceleration,
            )?;
        }

        let moving: Vec<&Segment> = chain
            .segments()
            .iter()
            .filter(|s| !s.is_degenerate())
            .collect();
        if moving.is_empty() {
            return Ok(VelocityProfile {
                distances: vec![0.0],
                velocities: vec![0.0],
                times: vec![0.0],
            });
        }

        let distances = self.build_grid(&moving, chain.corner_windows());
        let n = distances.len();

        let caps: Vec<f64> = distances
            .iter()
            .map(|&s| point_cap(&moving, chain.corner_windows(), s))
            .collect();
        let accels: Vec<f64> = distances
            .windows(2)
            .map(|w| segment_containing(&moving, 0.5 * (w[0] + w[1])).max_acceleration)
            .collect();

        // forward from rest
        let mut forward = vec![0.0; n];
        for i in 1..n {
            let ds = distances[i] - distances[i - 1];
            let reachable = (forward[i - 1] * forward[i - 1] + 2.0 * accels[i - 1] * ds).sqrt();
            forward[i] = caps[i].min(reachable);
        }

        // backward to rest
        let mut backward = vec![0.0; n];
        for i in (0..n - 1).rev() {
            let ds = distances[i + 1] - distances[i];
            let reachable = (backward[i + 1] * backward[i + 1] + 2.0 * accels[i] * ds).sqrt();
            backward[i] = caps[i].min(reachable);
        }

        let velocities: Vec<f64> = (0..n)
            .map(|i| {
                if i == 0 || i == n - 1 {
                    0.0
                } else {
                    forward[i].min(backward[i]).max(V_EPSILON)
                }
            })
            .collect();

        let mut times = Vec::with_capacity(n);
        times.push(0.0);
        for i in 1..n {
            let ds = distances[i] - distances[i - 1];
            let mean = 0.5 * (velocities[i - 1] + velocities[i]);
            let dt = ds / mean.max(V_EPSILON);
            times.push(times[i - 1] + dt);
        }

        let profile = VelocityProfile {
            distances,
            velocities,
            times,
        };
        debug!(
            "Profiled {:.3} m over {} grid points: duration {:.3} s, peak {:.3} m/s",
            profile.total_length(),
            n,
            profile.duration(),
            profile.velocities.iter().copied().fold(0.0, f64::max)
        );
        Ok(profile)
    }

    /// Grid with every segment boundary and window edge as a point, spans
    /// subdivided to at most `step` with at least two intervals each.
    fn build_grid(&self, moving: &[&Segment], windows: &[CornerWindow]) -> Vec<f64> {
        let mut breakpoints: Vec<f64> = moving
            .iter()
            .flat_map(|s| [s.start_distance, s.end_distance()])
            .chain(windows.iter().flat_map(|w| [w.start(), w.end()]))
            .collect();
        breakpoints.sort_by(f64::total_cmp);
        breakpoints.dedup_by(|a, b| (*a - *b).abs() <= BREAKPOINT_EPSILON);

        let mut grid = Vec::new();
        for span in breakpoints.windows(2) {
            let (a, b) = (span[0], span[1]);
            let intervals = ((b - a) / self.step).ceil().max(2.0) as usize;
            for k in 0..intervals {
                grid.push(a + (b - a) * k as f64 / intervals as f64);
            }
        }
        if let Some(&last) = breakpoints.last() {
            grid.push(last);
        }
        grid
    }
}

/// Segment whose span holds `s`, preferring the first one.
fn segment_containing<'a>(moving: &[&'a Segment], s: f64) -> &'a Segment {
    let index = moving
        .partition_point(|seg| seg.end_distance() < s)
        .min(moving.len() - 1);
    moving[index]
}

/// Velocity cap at a grid point: the segment limit inside a segment, the
/// smaller adjacent limit at a junction, lowered by any corner window.
fn point_cap(moving: &[&Segment], windows: &[CornerWindow], s: f64) -> f64 {
    let first = moving.partition_point(|seg| seg.end_distance() < s - BREAKPOINT_EPSILON);
    let segment_cap = moving[first.min(moving.len() - 1)..]
        .iter()
        .take_while(|seg| seg.start_distance <= s + BREAKPOINT_EPSILON)
        .map(|seg| seg.max_velocity)
        .fold(f64::INFINITY, f64::min);
    let segment_cap = if segment_cap.is_finite() {
        segment_cap
    } else {
        segment_containing(moving, s).max_velocity
    };

    let window_cap = windows
        .iter()
        .filter(|w| w.contains(s))
        .map(|w| w.cap_at(s))
        .fold(f64::INFINITY, f64::min);

    segment_cap.min(window_cap)
}
