//! # PathSim Engine
//!
//! Turns an authored path into a time-parameterized trajectory of robot poses.
//!
//! The pipeline runs strictly downstream:
//! - [`SegmentBuilder`] resolves elements into segments, heading anchors and
//!   corner windows
//! - [`MotionProfiler`] computes velocity over arc length and integrates time
//! - [`RotationInterpolator`] maps arc length to heading
//! - [`PoseSampler`] merges both schedules into a [`Timeline`]
//!
//! [`SimulationSession`] owns the committed timeline for playback;
//! [`BackgroundRebuilder`] rebuilds off-thread with last-writer-wins.

pub mod analysis;
pub mod profile;
pub mod rotation;
pub mod sampler;
pub mod segments;
pub mod session;
pub mod shared;
pub mod timeline;

pub use analysis::{TimelineAnalyzer, TimelineSummary};
pub use profile::{MotionProfiler, VelocityProfile};
pub use rotation::RotationInterpolator;
pub use sampler::PoseSampler;
pub use segments::{CornerWindow, HeadingAnchor, PositionAnchor, Segment, SegmentBuilder, SegmentChain};
pub use session::{PlaybackCursor, SimulationSession};
pub use shared::{BackgroundRebuilder, RebuildOutcome, SharedTimeline};
pub use timeline::{AngularRateWarning, Pose, PoseSample, Timeline};

use pathsim_core::{
    require_positive, ConstraintField, ConstraintLocation, Path, SimulationError, SimulationResult,
};
use pathsim_settings::SimulationConfig;
use tracing::{debug, warn};

/// Runs the full pipeline for `path`.
///
/// Identical inputs produce identical timelines. Config defaults are checked
/// first and reported at [`ConstraintLocation::Config`].
pub fn simulate(path: &Path, config: &SimulationConfig) -> SimulationResult<Timeline> {
    validate_defaults(config)?;
    let chain = SegmentBuilder::new(config).build(path)?;
    let profile = MotionProfiler::new().profile(&chain)?;
    let interpolator = RotationInterpolator::from_chain(&chain);

    let warnings = interpolator.angular_rate_warnings(&profile);
    for w in &warnings {
        warn!(
            "Heading change towards element {} needs {:.3} rad/s, limit is {:.3} rad/s",
            w.anchor, w.required, w.limit
        );
    }

    let timeline = PoseSampler::new(config.sample_time_step())
        .sample(&chain, &profile, &interpolator)
        .with_warnings(warnings);
    debug!(
        "Simulated {} elements: {:.3} m in {:.3} s",
        path.len(),
        timeline.total_length(),
        timeline.duration()
    );
    Ok(timeline)
}

/// Rejects kinematic defaults no path element could override safely.
///
/// A zero sample step is left to [`PoseSampler::new`], which falls back to
/// [`sampler::DEFAULT_TIME_STEP`].
fn validate_defaults(config: &SimulationConfig) -> SimulationResult<()> {
    let location = ConstraintLocation::Config;
    require_positive(
        Some(config.default_max_velocity),
        location,
        ConstraintField::MaxVelocity,
    )?;
    require_positive(
        Some(config.default_max_acceleration),
        location,
        ConstraintField::MaxAcceleration,
    )?;
    require_positive(
        Some(config.default_max_angular_velocity),
        location,
        ConstraintField::MaxAngularVelocity,
    )?;

    let radius = config.default_handoff_radius;
    if !radius.is_finite() || radius < 0.0 {
        return Err(SimulationError::invalid_constraint(
            location,
            ConstraintField::HandoffRadius,
            radius,
        ));
    }
    Ok(())
}
