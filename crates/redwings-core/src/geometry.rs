//! Joint angle and landmark distance computations.

use nalgebra::Point3;

use crate::config::ConfidenceGate;
use crate::types::Landmark;

/// Joint angle in degrees, `None` when a defining landmark was not trusted.
pub type AngleSample = Option<f64>;

/// Calculate the angle (degrees) at vertex `b` of the 3D triangle `a-b-c`.
///
/// cos(θ) = (ba · bc) / (|ba| × |bc| + ε), clamped to [-1, 1] before the
/// inverse cosine. Depth (`z`) takes part in both vectors.
pub fn angle_at(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, epsilon: f64) -> f64 {
    let ba = a - b;
    let bc = c - b;
    let cosine = ba.dot(&bc) / (ba.norm() * bc.norm() + epsilon);
    cosine.clamp(-1.0, 1.0).acos().to_degrees()
}

/// 3D Euclidean distance between two landmarks. Confidence is ignored.
pub fn landmark_distance(a: &Landmark, b: &Landmark) -> f64 {
    (a.position() - b.position()).norm()
}

/// Confidence-gated joint angle calculator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleCalculator {
    gate: ConfidenceGate,
}

impl AngleCalculator {
    pub fn new(gate: ConfidenceGate) -> Self {
        Self { gate }
    }

    /// Angle at `b`, or `None` if any of the three landmarks falls below
    /// the confidence gate.
    pub fn angle(&self, a: &Landmark, b: &Landmark, c: &Landmark) -> AngleSample {
        let min = self.gate.min_confidence;
        if a.confidence < min || b.confidence < min || c.confidence < min {
            return None;
        }
        Some(angle_at(
            &a.position(),
            &b.position(),
            &c.position(),
            self.gate.angle_epsilon,
        ))
    }
}

impl Default for AngleCalculator {
    fn default() -> Self {
        Self::new(ConfidenceGate::default())
    }
}
