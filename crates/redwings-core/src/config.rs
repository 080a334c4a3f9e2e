//! Tunable thresholds for the metrics pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Complete metrics configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Landmark confidence gating for joint angles
    pub gate: ConfidenceGate,

    /// Angles at or below this value (degrees) are detection glitches
    pub glitch_floor_deg: f64,

    /// Savitzky-Golay smoothing parameters
    pub smoothing: SmoothingConfig,

    /// Phase classification thresholds
    pub phases: PhaseThresholds,

    /// Timeline presentation precision
    pub rounding: RoundingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceGate {
    /// Minimum landmark confidence for a defined angle
    pub min_confidence: f64,

    /// Added to the vector-norm product before dividing
    pub angle_epsilon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Window length in samples (odd)
    pub window: usize,

    /// Polynomial order fitted inside each window
    pub poly_order: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseThresholds {
    /// Knee angle above which the leg counts as extended (degrees)
    pub extended_knee_deg: f64,

    /// Hip angle above which the torso counts as extended (degrees)
    pub extended_hip_deg: f64,

    /// Knee angle below which the leg counts as compressed (degrees)
    pub compressed_knee_deg: f64,

    /// Hip angle below which the hip counts as compressed (degrees)
    pub compressed_hip_deg: f64,

    /// Hip angle below which the torso counts as hinged forward (degrees)
    pub hinge_hip_deg: f64,

    /// Wrist separation below which the arms count as tucked (normalized units)
    pub tucked_arm_spread: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundingConfig {
    /// Decimal places for angles in the timeline
    pub angle_decimals: u32,

    /// Decimal places for distances and positions in the timeline
    pub distance_decimals: u32,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            gate: ConfidenceGate::default(),
            glitch_floor_deg: 25.0,
            smoothing: SmoothingConfig::default(),
            phases: PhaseThresholds::default(),
            rounding: RoundingConfig::default(),
        }
    }
}

impl Default for ConfidenceGate {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            angle_epsilon: 1e-6,
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            window: 7,
            poly_order: 2,
        }
    }
}

impl Default for PhaseThresholds {
    fn default() -> Self {
        Self {
            extended_knee_deg: 160.0,
            extended_hip_deg: 150.0,
            compressed_knee_deg: 90.0,
            compressed_hip_deg: 90.0,
            hinge_hip_deg: 110.0,
            tucked_arm_spread: 0.05,
        }
    }
}

impl Default for RoundingConfig {
    fn default() -> Self {
        Self {
            angle_decimals: 2,
            distance_decimals: 3,
        }
    }
}

impl MetricsConfig {
    /// Check internal consistency of the thresholds
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.gate.min_confidence) {
            return Err(Error::Config(format!(
                "min_confidence must be within [0, 1], got {}",
                self.gate.min_confidence
            )));
        }
        if !(self.gate.angle_epsilon > 0.0) {
            return Err(Error::Config("angle_epsilon must be positive".to_string()));
        }
        if !(0.0..180.0).contains(&self.glitch_floor_deg) {
            return Err(Error::Config(format!(
                "glitch_floor_deg must be within [0, 180), got {}",
                self.glitch_floor_deg
            )));
        }
        self.smoothing.validate()
    }
}

impl SmoothingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window % 2 == 0 {
            return Err(Error::Config(format!(
                "smoothing window must be odd, got {}",
                self.window
            )));
        }
        if self.poly_order >= self.window {
            return Err(Error::Config(format!(
                "poly_order {} must be less than window {}",
                self.poly_order, self.window
            )));
        }
        Ok(())
    }
}

/// Round to a fixed number of decimal places for presentation.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MetricsConfig::default();
        assert_eq!(config.gate.min_confidence, 0.5);
        assert_eq!(config.glitch_floor_deg, 25.0);
        assert_eq!(config.smoothing.window, 7);
        assert_eq!(config.smoothing.poly_order, 2);
        assert_eq!(config.phases.hinge_hip_deg, 110.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_even_window() {
        let mut config = MetricsConfig::default();
        config.smoothing.window = 6;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_order_at_window() {
        let smoothing = SmoothingConfig { window: 3, poly_order: 3 };
        assert!(smoothing.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: MetricsConfig =
            serde_json::from_str(r#"{"glitch_floor_deg": 30.0, "smoothing": {"window": 9}}"#).unwrap();
        assert_eq!(config.glitch_floor_deg, 30.0);
        assert_eq!(config.smoothing.window, 9);
        assert_eq!(config.smoothing.poly_order, 2);
        assert_eq!(config.phases.extended_knee_deg, 160.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.3456, 2), 12.35);
        assert_eq!(round_to(0.12345, 3), 0.123);
    }
}
