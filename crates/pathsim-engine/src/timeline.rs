//! Timeline of sampled poses.

use pathsim_core::{lerp_angle, Point};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Robot state at one sample time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseSample {
    /// Seconds since the start of the path
    pub time: f64,
    pub position: Point,
    /// Heading in radians
    pub heading: f64,
    /// Translational speed (m/s)
    pub velocity: f64,
}

impl PoseSample {
    pub fn new(time: f64, position: Point, heading: f64, velocity: f64) -> Self {
        Self {
            time,
            position,
            heading,
            velocity,
        }
    }
}

/// Interpolated robot state at an arbitrary playback time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub time: f64,
    pub position: Point,
    pub heading: f64,
    pub velocity: f64,
}

impl From<PoseSample> for Pose {
    fn from(sample: PoseSample) -> Self {
        Self {
            time: sample.time,
            position: sample.position,
            heading: sample.heading,
            velocity: sample.velocity,
        }
    }
}

/// A heading transition that needs a faster turn than its limit allows.
///
/// Reported only; the time schedule is never stretched to satisfy it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngularRateWarning {
    /// Element index of the anchor being turned towards
    pub anchor: usize,
    /// Turn rate the schedule demands (rad/s)
    pub required: f64,
    /// Configured limit (rad/s)
    pub limit: f64,
}

/// Strictly time-increasing sequence of pose samples.
///
/// Immutable once built; a rebuild produces a new timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeline")]
pub struct Timeline {
    samples: Vec<PoseSample>,
    total_length: f64,
    warnings: Vec<AngularRateWarning>,
}

/// Unchecked form of a deserialized [`Timeline`].
#[derive(Deserialize)]
struct RawTimeline {
    samples: Vec<PoseSample>,
    total_length: f64,
    warnings: Vec<AngularRateWarning>,
}

impl TryFrom<RawTimeline> for Timeline {
    type Error = String;

    fn try_from(raw: RawTimeline) -> Result<Self, Self::Error> {
        if raw.samples.is_empty() {
            return Err("timeline needs at least one sample".to_string());
        }
        if raw.samples[0].time != 0.0 {
            return Err(format!(
                "timeline must start at time 0, got {}",
                raw.samples[0].time
            ));
        }
        if let Some(index) = raw
            .samples
            .windows(2)
            .position(|w| w[1].time.partial_cmp(&w[0].time) != Some(Ordering::Greater))
        {
            return Err(format!(
                "sample times must be strictly increasing (sample {})",
                index + 1
            ));
        }
        Ok(Self::new(raw.samples, raw.total_length).with_warnings(raw.warnings))
    }
}

impl Timeline {
    /// Creates a timeline. The pipeline always produces at least one sample.
    pub fn new(samples: Vec<PoseSample>, total_length: f64) -> Self {
        debug_assert!(
            samples.windows(2).all(|w| w[0].time < w[1].time),
            "sample times must be strictly increasing"
        );
        Self {
            samples,
            total_length,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<AngularRateWarning>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn samples(&self) -> &[PoseSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time of the last sample
    pub fn duration(&self) -> f64 {
        self.samples.last().map_or(0.0, |s| s.time)
    }

    /// Arc length of the simulated path (m)
    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    pub fn warnings(&self) -> &[AngularRateWarning] {
        &self.warnings
    }

    /// Sample positions in time order.
    pub fn positions(&self) -> impl Iterator<Item = Point> + '_ {
        self.samples.iter().map(|s| s.position)
    }

    /// Clamps `t` into `[0, duration]`; NaN maps to 0.
    pub fn clamp_time(&self, t: f64) -> f64 {
        if t.is_nan() {
            0.0
        } else {
            t.clamp(0.0, self.duration())
        }
    }

    /// Index of the last sample with `time <= t`.
    ///
    /// Gallops forward from `hint` when `t` lies at or after the hinted sample
    /// and falls back to a binary search over the whole timeline otherwise.
    pub fn locate(&self, t: f64, hint: usize) -> usize {
        let t = self.clamp_time(t);
        let len = self.samples.len();
        if len <= 1 {
            return 0;
        }

        let hint = hint.min(len - 1);
        if self.samples[hint].time > t {
            return self.samples.partition_point(|s| s.time <= t).saturating_sub(1);
        }

        let mut low = hint;
        let mut step = 1;
        while low + step < len && self.samples[low + step].time <= t {
            low += step;
            step *= 2;
        }
        let high = (low + step).min(len);
        low + self.samples[low..high].partition_point(|s| s.time <= t) - 1
    }

    /// Pose at `t`, interpolated between the bracketing samples.
    ///
    /// Returns the pose and the index of the lower bracketing sample, for use
    /// as the next search hint. An empty timeline yields the origin pose.
    pub fn pose_at(&self, t: f64, hint: usize) -> (Pose, usize) {
        let t = self.clamp_time(t);
        let index = self.locate(t, hint);
        let Some(lower) = self.samples.get(index).copied() else {
            return (Pose::default(), 0);
        };
        let Some(upper) = self.samples.get(index + 1).copied() else {
            return (Pose::from(lower), index);
        };

        let span = upper.time - lower.time;
        let ratio = if span > 0.0 {
            ((t - lower.time) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let pose = Pose {
            time: t,
            position: lower.position.lerp(&upper.position, ratio),
            heading: lerp_angle(lower.heading, upper.heading, ratio),
            velocity: lower.velocity + (upper.velocity - lower.velocity) * ratio,
        };
        (pose, index)
    }

    /// Number of samples with `time <= t`.
    pub fn trail_len(&self, t: f64) -> usize {
        if t.is_nan() {
            return 0;
        }
        self.samples.partition_point(|s| s.time <= t)
    }

    /// All samples with `time <= t`.
    pub fn trail(&self, t: f64) -> &[PoseSample] {
        &self.samples[..self.trail_len(t)]
    }
}
