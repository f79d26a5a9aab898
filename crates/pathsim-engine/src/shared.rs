//! Background rebuilds over a shared timeline.
//!
//! Rebuilds run off the calling thread and publish through a reference swap,
//! so readers always see either the whole old timeline or the whole new one.
//! Each request takes a generation number; a result is installed only while
//! its generation is still the latest one issued.

use crate::session::PlaybackCursor;
use crate::simulate;
use crate::timeline::Timeline;
use parking_lot::RwLock;
use pathsim_core::{Path, SimulationError, SimulationResult};
use pathsim_settings::SimulationConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What happened to a finished rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
    /// The timeline of this generation is now committed
    Committed(u64),
    /// A newer request was issued before this one finished; result dropped
    Superseded(u64),
}

impl RebuildOutcome {
    pub fn generation(&self) -> u64 {
        match self {
            RebuildOutcome::Committed(g) | RebuildOutcome::Superseded(g) => *g,
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, RebuildOutcome::Committed(_))
    }
}

/// The committed timeline plus generation bookkeeping.
#[derive(Debug, Default)]
pub struct SharedTimeline {
    current: RwLock<Option<Arc<Timeline>>>,
    issued: AtomicU64,
    committed: AtomicU64,
}

impl SharedTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next generation number, starting at 1.
    pub fn next_generation(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn latest_generation(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// Generation of the committed timeline, 0 when none.
    pub fn committed_generation(&self) -> u64 {
        self.committed.load(Ordering::SeqCst)
    }

    /// Installs `timeline` if `generation` is still the latest issued.
    pub fn publish(&self, generation: u64, timeline: Arc<Timeline>) -> bool {
        let mut current = self.current.write();
        if generation != self.latest_generation() {
            return false;
        }
        *current = Some(timeline);
        self.committed.store(generation, Ordering::SeqCst);
        true
    }

    /// The committed timeline, if any.
    pub fn snapshot(&self) -> Option<Arc<Timeline>> {
        self.current.read().clone()
    }

    /// A fresh cursor over the committed timeline.
    pub fn cursor(&self) -> Option<PlaybackCursor> {
        self.snapshot().map(PlaybackCursor::new)
    }
}

/// Runs rebuilds on the blocking pool and publishes them last-writer-wins.
#[derive(Debug, Clone)]
pub struct BackgroundRebuilder {
    shared: Arc<SharedTimeline>,
}

impl BackgroundRebuilder {
    pub fn new(shared: Arc<SharedTimeline>) -> Self {
        Self { shared }
    }

    pub fn shared(&self) -> &Arc<SharedTimeline> {
        &self.shared
    }

    /// Rebuilds the timeline for `path`.
    ///
    /// # Errors
    /// Pipeline errors are returned unchanged and leave the committed timeline
    /// in place; a panicked or cancelled task yields `RebuildAborted`.
    pub async fn rebuild(
        &self,
        path: Path,
        config: SimulationConfig,
    ) -> SimulationResult<RebuildOutcome> {
        let generation = self.shared.next_generation();
        debug!("Rebuild generation {} started", generation);

        let timeline = tokio::task::spawn_blocking(move || simulate(&path, &config))
            .await
            .map_err(|e| SimulationError::RebuildAborted {
                reason: e.to_string(),
            })?
            .inspect_err(|err| {
                warn!("Rebuild generation {} rejected: {}", generation, err);
            })?;

        if self.shared.publish(generation, Arc::new(timeline)) {
            info!("Rebuild generation {} committed", generation);
            Ok(RebuildOutcome::Committed(generation))
        } else {
            debug!(
                "Rebuild generation {} superseded by {}",
                generation,
                self.shared.latest_generation()
            );
            Ok(RebuildOutcome::Superseded(generation))
        }
    }
}
