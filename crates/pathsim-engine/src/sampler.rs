//! Pose sampling.
//!
//! Merges the time schedule and the heading schedule into a [`Timeline`]:
//! one sample every time step, plus a sample exactly at every position and
//! heading anchor, and a final sample at the total duration.

use crate::profile::VelocityProfile;
use crate::rotation::RotationInterpolator;
use crate::segments::SegmentChain;
use crate::timeline::{PoseSample, Timeline};
use tracing::{debug, warn};

/// Default sample spacing (s)
pub const DEFAULT_TIME_STEP: f64 = 0.02;

/// Sample times closer than this are merged (s)
const TIME_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
struct Candidate {
    time: f64,
    /// Exact arc length for anchor samples
    distance: Option<f64>,
}

/// Builds timelines at a fixed time step.
#[derive(Debug, Clone)]
pub struct PoseSampler {
    time_step: f64,
}

impl Default for PoseSampler {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_STEP)
    }
}

impl PoseSampler {
    /// Creates a sampler; a non-positive or non-finite step falls back to
    /// [`DEFAULT_TIME_STEP`].
    pub fn new(time_step: f64) -> Self {
        let time_step = if time_step.is_finite() && time_step > 0.0 {
            time_step
        } else {
            warn!(
                "Invalid sample time step {}, using {} s",
                time_step, DEFAULT_TIME_STEP
            );
            DEFAULT_TIME_STEP
        };
        Self { time_step }
    }

    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    /// Samples the trajectory.
    pub fn sample(
        &self,
        chain: &SegmentChain,
        profile: &VelocityProfile,
        interpolator: &RotationInterpolator,
    ) -> Timeline {
        let duration = profile.duration();
        let total_length = chain.total_length();

        if duration <= 0.0 {
            let sample = PoseSample::new(
                0.0,
                chain.position_at(0.0),
                interpolator.heading_at(0.0),
                0.0,
            );
            return Timeline::new(vec![sample], total_length);
        }

        let candidates = self.candidates(chain, profile, interpolator, duration);
        let samples: Vec<PoseSample> = candidates
            .iter()
            .map(|c| {
                let s = c.distance.unwrap_or_else(|| profile.distance_at(c.time));
                PoseSample::new(
                    c.time,
                    chain.position_at(s),
                    interpolator.heading_at(s),
                    profile.velocity_at(c.time),
                )
            })
            .collect();

        debug!(
            "Sampled {} poses over {:.3} s at {:.3} s step",
            samples.len(),
            duration,
            self.time_step
        );
        Timeline::new(samples, total_length)
    }

    fn candidates(
        &self,
        chain: &SegmentChain,
        profile: &VelocityProfile,
        interpolator: &RotationInterpolator,
        duration: f64,
    ) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = (0u64..)
            .map(|k| k as f64 * self.time_step)
            .take_while(|&t| t < duration)
            .map(|time| Candidate {
                time,
                distance: None,
            })
            .collect();

        let anchors = chain
            .anchor_positions()
            .chain(interpolator.anchors().iter().map(|a| a.distance));
        for distance in anchors {
            candidates.push(Candidate {
                time: profile.time_at(distance).clamp(0.0, duration),
                distance: Some(distance),
            });
        }
        candidates.push(Candidate {
            time: duration,
            distance: Some(chain.total_length()),
        });

        candidates.sort_by(|a, b| a.time.total_cmp(&b.time));

        let mut merged: Vec<Candidate> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            match merged.last_mut() {
                Some(last) if candidate.time - last.time <= TIME_EPSILON => {
                    last.time = candidate.time;
                    last.distance = last.distance.or(candidate.distance);
                }
                _ => merged.push(candidate),
            }
        }
        // the duration sample sorts last, keep its time exact
        if let Some(last) = merged.last_mut() {
            last.time = duration;
        }
        merged
    }
}
