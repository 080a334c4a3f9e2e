//! Per-frame movement phase classification.
//!
//! A phase describes the gross body configuration at one frame (compressed,
//! extended, leaning, tucked) independent of which trick is being performed.
//! Classification is a fixed priority list of rules; the first rule whose
//! predicate holds decides the label:
//!
//! | # | Rule               | Predicate                          |
//! |---|--------------------|------------------------------------|
//! | 1 | `unknown`          | knee or hip undefined              |
//! | 2 | `extended`         | knee > 160 and hip > 150           |
//! | 3 | `deep_compression` | knee < 90 and hip < 90             |
//! | 4 | `knee_compression` | knee < 90                          |
//! | 5 | `hip_hinge`        | hip < 110                          |
//! | 6 | `arms_tucked`      | arm spread defined and < 0.05      |
//! | 7 | `athletic_stance`  | always                             |
//!
//! Compression is checked before lean and lean before tuck, so a deep landing
//! that also satisfies the looser hinge threshold is reported as compression.

use std::fmt;

use redwings_core::{AngleSample, PhaseThresholds};
use serde::{Deserialize, Serialize};

/// Discrete body-configuration label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Extended,
    DeepCompression,
    KneeCompression,
    HipHinge,
    ArmsTucked,
    AthleticStance,
    Unknown,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Extended => "extended",
            Phase::DeepCompression => "deep_compression",
            Phase::KneeCompression => "knee_compression",
            Phase::HipHinge => "hip_hinge",
            Phase::ArmsTucked => "arms_tucked",
            Phase::AthleticStance => "athletic_stance",
            Phase::Unknown => "unknown",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Phase::Extended => "Standing tall - approach, riding out or airborne",
            Phase::DeepCompression => "Very bent at knee and hip - hard landing, deep carve or press",
            Phase::KneeCompression => "Knees bent - ollie prep, press or carve",
            Phase::HipHinge => "Forward lean from the hips - butter, nose or tail press",
            Phase::ArmsTucked => "Arms pulled in - spin or rotation",
            Phase::AthleticStance => "Neutral athletic riding position",
            Phase::Unknown => "Knee or hip not visible with enough confidence",
        }
    }

    /// Compression states worth flagging for landing safety.
    pub fn is_compression(&self) -> bool {
        matches!(self, Phase::DeepCompression | Phase::KneeCompression)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Smoothed values of one frame fed to the classifier
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PhaseInput {
    pub knee: AngleSample,
    pub hip: AngleSample,
    pub arm_spread: Option<f64>,
}

impl PhaseInput {
    pub fn new(knee: AngleSample, hip: AngleSample, arm_spread: Option<f64>) -> Self {
        Self {
            knee,
            hip,
            arm_spread,
        }
    }
}

type Predicate = fn(&PhaseInput, &PhaseThresholds) -> bool;

/// One entry of the priority list
#[derive(Clone, Copy)]
pub struct PhaseRule {
    pub phase: Phase,
    predicate: Predicate,
}

impl PhaseRule {
    pub fn matches(&self, input: &PhaseInput, thresholds: &PhaseThresholds) -> bool {
        (self.predicate)(input, thresholds)
    }
}

impl fmt::Debug for PhaseRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseRule").field("phase", &self.phase).finish()
    }
}

fn knee_hip(input: &PhaseInput) -> Option<(f64, f64)> {
    Some((input.knee?, input.hip?))
}

static RULES: [PhaseRule; 7] = [
    PhaseRule {
        phase: Phase::Unknown,
        predicate: |i, _| knee_hip(i).is_none(),
    },
    PhaseRule {
        phase: Phase::Extended,
        predicate: |i, t| {
            knee_hip(i).is_some_and(|(k, h)| k > t.extended_knee_deg && h > t.extended_hip_deg)
        },
    },
    PhaseRule {
        phase: Phase::DeepCompression,
        predicate: |i, t| {
            knee_hip(i).is_some_and(|(k, h)| k < t.compressed_knee_deg && h < t.compressed_hip_deg)
        },
    },
    PhaseRule {
        phase: Phase::KneeCompression,
        predicate: |i, t| i.knee.is_some_and(|k| k < t.compressed_knee_deg),
    },
    PhaseRule {
        phase: Phase::HipHinge,
        predicate: |i, t| i.hip.is_some_and(|h| h < t.hinge_hip_deg),
    },
    PhaseRule {
        phase: Phase::ArmsTucked,
        predicate: |i, t| i.arm_spread.is_some_and(|a| a < t.tucked_arm_spread),
    },
    PhaseRule {
        phase: Phase::AthleticStance,
        predicate: |_, _| true,
    },
];

/// First-match-wins phase classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseClassifier {
    thresholds: PhaseThresholds,
}

impl PhaseClassifier {
    pub fn new(thresholds: PhaseThresholds) -> Self {
        Self { thresholds }
    }

    /// The rules in evaluation order.
    pub fn rules() -> &'static [PhaseRule] {
        &RULES
    }

    pub fn classify(&self, input: &PhaseInput) -> Phase {
        self.matching_rule(input).0
    }

    /// Label together with the 1-based position of the rule that fired.
    pub fn matching_rule(&self, input: &PhaseInput) -> (Phase, usize) {
        RULES
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.matches(input, &self.thresholds))
            .map(|(i, rule)| (rule.phase, i + 1))
            .unwrap_or((Phase::AthleticStance, RULES.len()))
    }
}
