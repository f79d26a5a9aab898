//! Timeline analysis.

use crate::timeline::Timeline;
use pathsim_core::shortest_angular_distance;
use serde::Serialize;

/// Aggregate figures for one timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSummary {
    pub total_length: f64,
    pub duration: f64,
    pub peak_velocity: f64,
    pub average_velocity: f64,
    pub peak_heading_rate: f64,
    pub sample_count: usize,
    pub warning_count: usize,
}

/// Analyzes a timeline for display next to the path.
pub struct TimelineAnalyzer<'a> {
    timeline: &'a Timeline,
}

impl<'a> TimelineAnalyzer<'a> {
    /// Creates a new timeline analyzer.
    pub fn new(timeline: &'a Timeline) -> Self {
        Self { timeline }
    }

    /// Total path length (m).
    pub fn total_length(&self) -> f64 {
        self.timeline.total_length()
    }

    /// Total travel time (s).
    pub fn duration(&self) -> f64 {
        self.timeline.duration()
    }

    /// Highest sampled speed (m/s).
    pub fn peak_velocity(&self) -> f64 {
        self.timeline
            .samples()
            .iter()
            .map(|s| s.velocity)
            .fold(0.0, f64::max)
    }

    /// Path length over duration, 0 for a zero-duration timeline.
    pub fn average_velocity(&self) -> f64 {
        let duration = self.duration();
        if duration > 0.0 {
            self.total_length() / duration
        } else {
            0.0
        }
    }

    /// Fastest turn between consecutive samples (rad/s).
    pub fn peak_heading_rate(&self) -> f64 {
        self.timeline
            .samples()
            .windows(2)
            .map(|w| {
                let turn = shortest_angular_distance(w[0].heading, w[1].heading).abs();
                turn / (w[1].time - w[0].time)
            })
            .fold(0.0, f64::max)
    }

    pub fn sample_count(&self) -> usize {
        self.timeline.len()
    }

    pub fn summary(&self) -> TimelineSummary {
        TimelineSummary {
            total_length: self.total_length(),
            duration: self.duration(),
            peak_velocity: self.peak_velocity(),
            average_velocity: self.average_velocity(),
            peak_heading_rate: self.peak_heading_rate(),
            sample_count: self.sample_count(),
            warning_count: self.timeline.warnings().len(),
        }
    }
}
