//! # PathSim
//!
//! Kinematic path simulation for robot path editors:
//! - Two-pass velocity profiling under per-segment velocity and acceleration limits
//! - Heading interpolation over arc length, independent of the speed schedule
//! - Strictly time-ordered pose timelines with fast seek and incremental trails
//!
//! ## Architecture
//!
//! PathSim is organized as a workspace with multiple crates:
//!
//! 1. **pathsim-core** - Path model, geometry helpers, error taxonomy
//! 2. **pathsim-settings** - Simulation defaults, validation, JSON/TOML persistence
//! 3. **pathsim-engine** - Segment builder, profiler, interpolator, sampler, playback
//! 4. **pathsim** - This facade: re-exports and logging setup

pub use pathsim_core::{
    lerp_angle, shortest_angular_distance, wrap_angle, ConstraintField, ConstraintLocation, Path,
    PathElement, Point, RangedConstraint, RangedConstraintKind, RotationTarget, SimulationError,
    SimulationResult, TranslationTarget, Waypoint,
};
pub use pathsim_engine::{
    simulate, AngularRateWarning, BackgroundRebuilder, MotionProfiler, PlaybackCursor, Pose,
    PoseSample, PoseSampler, RebuildOutcome, RotationInterpolator, SegmentBuilder, SegmentChain,
    SharedTimeline, SimulationSession, Timeline, TimelineAnalyzer, TimelineSummary,
    VelocityProfile,
};
pub use pathsim_settings::{ConfigError, SettingsError, SimulationConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line human readable output
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    init_logging_with(LogFormat::Pretty)
}

/// Initialize logging to stdout in the given format.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging_with(format: LogFormat) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    match format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_line_number(true)
                .pretty();

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .json();

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
    }

    Ok(())
}

/// Load the simulation config from the platform config directory, falling
/// back to defaults when no file exists there.
pub fn load_default_config() -> anyhow::Result<SimulationConfig> {
    let path = SimulationConfig::default_config_path()?;
    let config = SimulationConfig::load_or_default(&path)?;
    tracing::debug!("Using simulation config {:?}", config);
    Ok(config)
}
