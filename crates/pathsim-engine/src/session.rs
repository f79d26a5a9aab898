//! Playback session.
//!
//! A [`SimulationSession`] owns the committed timeline and answers seek and
//! trail queries for a UI ticking at a fixed rate. Playback state lives in a
//! [`PlaybackCursor`], which can also be handed out independently over a
//! shared timeline.

use crate::simulate;
use crate::timeline::{Pose, PoseSample, Timeline};
use pathsim_core::{Path, Point, SimulationResult};
use pathsim_settings::SimulationConfig;
use std::sync::Arc;
use tracing::{info, trace, warn};

/// Seek and trail state over one immutable timeline.
#[derive(Debug, Clone)]
pub struct PlaybackCursor {
    timeline: Arc<Timeline>,
    /// Lower bracketing sample of the last seek
    index: usize,
    /// Number of samples already handed out by `reveal_trail`
    revealed: usize,
}

impl PlaybackCursor {
    pub fn new(timeline: Arc<Timeline>) -> Self {
        Self {
            timeline,
            index: 0,
            revealed: 0,
        }
    }

    pub fn timeline(&self) -> &Arc<Timeline> {
        &self.timeline
    }

    pub fn duration(&self) -> f64 {
        self.timeline.duration()
    }

    /// Index of the sample the last seek landed on.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Pose at `t`, clamped into `[0, duration]`.
    pub fn seek(&mut self, t: f64) -> Pose {
        let (pose, index) = self.timeline.pose_at(t, self.index);
        trace!("seek {:.4} s -> sample {} (was {})", t, index, self.index);
        self.index = index;
        pose
    }

    /// Samples with `time <= t`.
    pub fn trail_up_to(&self, t: f64) -> &[PoseSample] {
        self.timeline.trail(t)
    }

    /// Positions revealed since the previous call; empty when `t` has not
    /// moved past the furthest revealed sample.
    pub fn reveal_trail(&mut self, t: f64) -> Vec<Point> {
        let end = self.timeline.trail_len(t);
        if end <= self.revealed {
            return Vec::new();
        }
        let fresh = self.timeline.samples()[self.revealed..end]
            .iter()
            .map(|s| s.position)
            .collect();
        self.revealed = end;
        fresh
    }

    /// Clears seek and reveal bookkeeping.
    pub fn reset(&mut self) {
        self.index = 0;
        self.revealed = 0;
    }
}

/// Owns the committed timeline of one path view.
#[derive(Debug, Default)]
pub struct SimulationSession {
    cursor: Option<PlaybackCursor>,
}

impl SimulationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the full pipeline and installs the result.
    ///
    /// On failure the previously committed timeline stays in place and the
    /// error is returned.
    pub fn rebuild(&mut self, path: &Path, config: &SimulationConfig) -> SimulationResult<()> {
        match simulate(path, config) {
            Ok(timeline) => {
                info!(
                    "Committed timeline: {} samples, {:.3} s",
                    timeline.len(),
                    timeline.duration()
                );
                self.install(Arc::new(timeline));
                Ok(())
            }
            Err(err) => {
                warn!("Rebuild rejected, keeping previous timeline: {}", err);
                Err(err)
            }
        }
    }

    /// Installs an already built timeline, resetting playback state.
    pub fn install(&mut self, timeline: Arc<Timeline>) {
        self.cursor = Some(PlaybackCursor::new(timeline));
    }

    pub fn timeline(&self) -> Option<&Arc<Timeline>> {
        self.cursor.as_ref().map(PlaybackCursor::timeline)
    }

    /// Pose at `t`; `None` until a rebuild has succeeded.
    pub fn seek(&mut self, t: f64) -> Option<Pose> {
        self.cursor.as_mut().map(|cursor| cursor.seek(t))
    }

    /// Positions of every sample with `time <= t`.
    pub fn trail_up_to(&self, t: f64) -> Vec<Point> {
        self.cursor
            .as_ref()
            .map(|cursor| cursor.trail_up_to(t).iter().map(|s| s.position).collect())
            .unwrap_or_default()
    }

    /// Positions revealed since the previous call.
    pub fn reveal_trail(&mut self, t: f64) -> Vec<Point> {
        self.cursor
            .as_mut()
            .map(|cursor| cursor.reveal_trail(t))
            .unwrap_or_default()
    }

    /// Duration of the committed timeline, 0 when there is none.
    pub fn duration(&self) -> f64 {
        self.cursor.as_ref().map_or(0.0, PlaybackCursor::duration)
    }

    /// Sample index of the last seek.
    pub fn current_index(&self) -> Option<usize> {
        self.cursor.as_ref().map(PlaybackCursor::index)
    }

    pub fn reset(&mut self) {
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.reset();
        }
    }
}
