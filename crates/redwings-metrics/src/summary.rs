//! Metrics summary record handed to downstream consumers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::phase::Phase;

/// Error message set when no frame yields a usable knee or hip angle.
pub const NO_VALID_ANGLES: &str =
    "No valid knee or hip angles detected: landmarks were missing or below the confidence threshold";

/// Phase label of one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseEntry {
    pub frame: usize,
    pub phase: Phase,
}

/// Per-frame timeline record, rounded for presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameMetrics {
    pub frame: usize,
    pub right_knee_angle: Option<f64>,
    pub left_knee_angle: Option<f64>,
    pub knee_symmetry: f64,
    pub right_hip_angle: Option<f64>,
    pub elbow_angle: Option<f64>,
    pub arm_spread: f64,
    pub stance_width: f64,
    pub center_of_mass_x: f64,
    pub center_of_mass_y: f64,
}

/// Aggregate biomechanical summary of one analyzed sequence.
///
/// Scalars are `None` when they could not be computed. On the degenerate
/// path `error` is set, every scalar is `None` and both arrays are empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    // Knee
    pub knee_angle_avg: Option<f64>,
    /// Deepest bend, typically the landing impact
    pub knee_angle_min: Option<f64>,
    /// Most extended, typically in the air
    pub knee_angle_max: Option<f64>,
    pub knee_symmetry_avg: Option<f64>,

    // Hip
    pub hip_angle_avg: Option<f64>,
    /// Most forward lean
    pub hip_angle_min: Option<f64>,

    // Arms and balance
    pub elbow_angle_avg: Option<f64>,
    pub arm_spread_avg: Option<f64>,
    /// Near zero means arms tucked, likely spinning
    pub arm_spread_min: Option<f64>,
    pub stance_width_avg: Option<f64>,
    /// Around 0.5 means centered in frame
    pub center_of_mass_x_avg: Option<f64>,
    /// Side-to-side instability
    pub center_of_mass_x_std: Option<f64>,

    // Joint velocity
    pub knee_velocity_avg: Option<f64>,
    /// Hardest landing moment
    pub knee_velocity_max: Option<f64>,

    pub trick_phases: Vec<PhaseEntry>,
    pub frame_by_frame: Vec<FrameMetrics>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Which path produced a summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryStatus<'a> {
    /// No input frames
    Empty,
    /// Frames were present but nothing usable was detected
    Degenerate(&'a str),
    Complete,
}

impl MetricsSummary {
    /// Summary for an empty sequence.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Summary for a sequence without any valid knee or hip angle.
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn status(&self) -> SummaryStatus<'_> {
        match &self.error {
            Some(message) => SummaryStatus::Degenerate(message),
            None if self.frame_by_frame.is_empty() => SummaryStatus::Empty,
            None => SummaryStatus::Complete,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.status(), SummaryStatus::Empty)
    }

    pub fn frame_count(&self) -> usize {
        self.frame_by_frame.len()
    }

    /// Number of frames labelled with `phase`.
    pub fn phase_count(&self, phase: Phase) -> usize {
        self.trick_phases.iter().filter(|p| p.phase == phase).count()
    }

    /// Most frequent phase other than `Unknown`; ties go to the phase seen first.
    pub fn dominant_phase(&self) -> Option<Phase> {
        let mut counts: HashMap<Phase, (usize, usize)> = HashMap::new();
        for entry in self.trick_phases.iter().filter(|p| p.phase != Phase::Unknown) {
            counts.entry(entry.phase).or_insert((0, entry.frame)).0 += 1;
        }
        counts
            .into_iter()
            .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(b.1 .1.cmp(&a.1 .1)))
            .map(|(phase, _)| phase)
    }

    /// Frame with the largest knee angle change from its predecessor.
    pub fn hardest_impact_frame(&self) -> Option<usize> {
        self.frame_by_frame
            .windows(2)
            .filter_map(|w| {
                let delta = (w[1].right_knee_angle? - w[0].right_knee_angle?).abs();
                Some((w[1].frame, delta))
            })
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(frame, _)| frame)
    }
}
