//! End-to-end metrics extraction over a landmark sequence.
//!
//! Landmark indices (33-point body model):
//! - 11/12 shoulders, 13/14 elbows, 15/16 wrists
//! - 23/24 hips, 25/26 knees, 27/28 ankles
//!
//! Pipeline: per-frame angles and distances, Savitzky-Golay smoothing of each
//! angle series, glitch filtering, symmetry and velocity, per-frame phase,
//! then summary statistics plus the rounded timeline.

use redwings_core::{
    landmark_distance, round_to, AngleCalculator, AngleSample, Frame, MetricsConfig, PoseLandmark,
    Result,
};
use tracing::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::phase::{PhaseClassifier, PhaseInput};
use crate::smoothing::SignalSmoother;
use crate::statistics::{defined, max, mean, min, std_dev, valid_above};
use crate::summary::{FrameMetrics, MetricsSummary, PhaseEntry, NO_VALID_ANGLES};

/// Raw measurements of a single frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSample {
    pub right_knee: AngleSample,
    pub left_knee: AngleSample,
    pub right_hip: AngleSample,
    pub right_elbow: AngleSample,
    /// Wrist-to-wrist distance
    pub arm_spread: f64,
    /// Ankle-to-ankle distance
    pub stance_width: f64,
    /// Hip midpoint, proxy for the center of mass
    pub center_of_mass: (f64, f64),
}

/// Column-wise series for a whole sequence, one entry per frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JointSeries {
    pub right_knee: Vec<AngleSample>,
    pub left_knee: Vec<AngleSample>,
    pub right_hip: Vec<AngleSample>,
    pub right_elbow: Vec<AngleSample>,
    pub arm_spread: Vec<f64>,
    pub stance_width: Vec<f64>,
    pub center_of_mass_x: Vec<f64>,
    pub center_of_mass_y: Vec<f64>,
}

impl JointSeries {
    fn from_samples(samples: &[FrameSample]) -> Self {
        let mut series = Self::default();
        for s in samples {
            series.right_knee.push(s.right_knee);
            series.left_knee.push(s.left_knee);
            series.right_hip.push(s.right_hip);
            series.right_elbow.push(s.right_elbow);
            series.arm_spread.push(s.arm_spread);
            series.stance_width.push(s.stance_width);
            series.center_of_mass_x.push(s.center_of_mass.0);
            series.center_of_mass_y.push(s.center_of_mass.1);
        }
        series
    }

    pub fn len(&self) -> usize {
        self.right_knee.len()
    }

    pub fn is_empty(&self) -> bool {
        self.right_knee.is_empty()
    }
}

/// Metrics aggregator orchestrating geometry, smoothing and classification
#[derive(Debug, Clone)]
pub struct MetricsAggregator {
    config: MetricsConfig,
    angles: AngleCalculator,
    smoother: SignalSmoother,
    classifier: PhaseClassifier,
}

impl MetricsAggregator {
    pub fn new(config: MetricsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            angles: AngleCalculator::new(config.gate),
            smoother: SignalSmoother::new(config.smoothing)?,
            classifier: PhaseClassifier::new(config.phases),
            config,
        })
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Measure one frame.
    pub fn sample_frame(&self, frame: &Frame) -> FrameSample {
        use PoseLandmark::*;

        let angle = |a, b, c| {
            self.angles
                .angle(frame.landmark(a), frame.landmark(b), frame.landmark(c))
        };
        let distance = |a, b| landmark_distance(frame.landmark(a), frame.landmark(b));

        let left_hip = frame.landmark(LeftHip);
        let right_hip = frame.landmark(RightHip);

        FrameSample {
            right_knee: angle(RightHip, RightKnee, RightAnkle),
            left_knee: angle(LeftHip, LeftKnee, LeftAnkle),
            right_hip: angle(RightShoulder, RightHip, RightKnee),
            right_elbow: angle(RightShoulder, RightElbow, RightWrist),
            arm_spread: distance(LeftWrist, RightWrist),
            stance_width: distance(LeftAnkle, RightAnkle),
            center_of_mass: (
                (left_hip.x + right_hip.x) / 2.0,
                (left_hip.y + right_hip.y) / 2.0,
            ),
        }
    }

    /// Measure every frame. Frames are independent, so with the `parallel`
    /// feature this fans out across the rayon pool; order is preserved.
    pub fn extract_series(&self, sequence: &[Frame]) -> JointSeries {
        #[cfg(feature = "parallel")]
        let samples: Vec<FrameSample> = sequence.par_iter().map(|f| self.sample_frame(f)).collect();

        #[cfg(not(feature = "parallel"))]
        let samples: Vec<FrameSample> = sequence.iter().map(|f| self.sample_frame(f)).collect();

        JointSeries::from_samples(&samples)
    }

    /// Convert a landmark sequence into the biomechanical summary.
    ///
    /// Never fails: an empty sequence yields [`MetricsSummary::empty`], and a
    /// sequence without any valid knee or hip angle yields
    /// [`MetricsSummary::degenerate`].
    pub fn extract_metrics(&self, sequence: &[Frame]) -> MetricsSummary {
        if sequence.is_empty() {
            debug!("Empty landmark sequence, nothing to analyze");
            return MetricsSummary::empty();
        }

        debug!("Extracting metrics from {} frames", sequence.len());

        let raw = self.extract_series(sequence);

        let right_knee = self.smoother.smooth(&raw.right_knee);
        let left_knee = self.smoother.smooth(&raw.left_knee);
        let right_hip = self.smoother.smooth(&raw.right_hip);
        let right_elbow = self.smoother.smooth(&raw.right_elbow);

        let floor = self.config.glitch_floor_deg;
        let valid_knee = valid_above(&right_knee, floor);
        let valid_hip = valid_above(&right_hip, floor);

        if valid_knee.is_empty() || valid_hip.is_empty() {
            warn!(
                frames = sequence.len(),
                valid_knee = valid_knee.len(),
                valid_hip = valid_hip.len(),
                "No usable knee/hip angles in sequence"
            );
            return MetricsSummary::degenerate(NO_VALID_ANGLES);
        }

        let symmetry = knee_symmetry(&right_knee, &left_knee);
        let velocity = knee_velocity(&right_knee);

        let trick_phases: Vec<PhaseEntry> = (0..raw.len())
            .map(|i| PhaseEntry {
                frame: i,
                phase: self.classifier.classify(&PhaseInput::new(
                    right_knee[i],
                    right_hip[i],
                    Some(raw.arm_spread[i]),
                )),
            })
            .collect();

        let angle_dp = self.config.rounding.angle_decimals;
        let dist_dp = self.config.rounding.distance_decimals;
        let round_angle = |a: AngleSample| a.map(|v| round_to(v, angle_dp));

        let frame_by_frame: Vec<FrameMetrics> = (0..raw.len())
            .map(|i| FrameMetrics {
                frame: i,
                right_knee_angle: round_angle(right_knee[i]),
                left_knee_angle: round_angle(left_knee[i]),
                knee_symmetry: round_to(symmetry[i], angle_dp),
                right_hip_angle: round_angle(right_hip[i]),
                elbow_angle: round_angle(right_elbow[i]),
                arm_spread: round_to(raw.arm_spread[i], dist_dp),
                stance_width: round_to(raw.stance_width[i], dist_dp),
                center_of_mass_x: round_to(raw.center_of_mass_x[i], dist_dp),
                center_of_mass_y: round_to(raw.center_of_mass_y[i], dist_dp),
            })
            .collect();

        MetricsSummary {
            knee_angle_avg: mean(&valid_knee),
            knee_angle_min: min(&valid_knee),
            knee_angle_max: max(&valid_knee),
            knee_symmetry_avg: mean(&symmetry),

            hip_angle_avg: mean(&valid_hip),
            hip_angle_min: min(&valid_hip),

            elbow_angle_avg: mean(&defined(&right_elbow)),
            arm_spread_avg: mean(&raw.arm_spread),
            arm_spread_min: min(&raw.arm_spread),
            stance_width_avg: mean(&raw.stance_width),
            center_of_mass_x_avg: mean(&raw.center_of_mass_x),
            center_of_mass_x_std: std_dev(&raw.center_of_mass_x),

            knee_velocity_avg: mean(&velocity),
            knee_velocity_max: max(&velocity),

            trick_phases,
            frame_by_frame,
            error: None,
        }
    }
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        let config = MetricsConfig::default();
        Self {
            angles: AngleCalculator::new(config.gate),
            smoother: SignalSmoother::default(),
            classifier: PhaseClassifier::new(config.phases),
            config,
        }
    }
}

/// `|right[i] - left[i]|` per frame, 0.0 where either side is undefined.
pub fn knee_symmetry(right: &[AngleSample], left: &[AngleSample]) -> Vec<f64> {
    right
        .iter()
        .zip(left)
        .map(|(r, l)| match (r, l) {
            (Some(r), Some(l)) => (r - l).abs(),
            _ => 0.0,
        })
        .collect()
}

/// `|series[i] - series[i-1]|` for `i >= 1`, 0.0 where either endpoint is
/// undefined. One entry shorter than the input.
pub fn knee_velocity(series: &[AngleSample]) -> Vec<f64> {
    series
        .windows(2)
        .map(|w| match (w[0], w[1]) {
            (Some(prev), Some(curr)) => (curr - prev).abs(),
            _ => 0.0,
        })
        .collect()
}

/// Extract metrics with the default thresholds.
pub fn extract_metrics(sequence: &[Frame]) -> MetricsSummary {
    MetricsAggregator::default().extract_metrics(sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::Phase;
    use crate::summary::SummaryStatus;
    use redwings_core::Landmark;

    /// Frame with every landmark at zero confidence except those given.
    fn frame_with(points: &[(PoseLandmark, Landmark)]) -> Frame {
        let mut frame = Frame::default();
        for (which, lm) in points {
            frame.set(*which, *lm).unwrap();
        }
        frame
    }

    /// Right leg at a 90 degree knee; shoulder placed to give `hip_deg` at the hip.
    fn right_angle_frame(hip_deg: f64, ankle: (f64, f64)) -> Frame {
        let rad = hip_deg.to_radians();
        frame_with(&[
            (PoseLandmark::RightHip, Landmark::certain(0.0, 1.0, 0.0)),
            (PoseLandmark::RightKnee, Landmark::certain(0.0, 0.0, 0.0)),
            (PoseLandmark::RightAnkle, Landmark::certain(ankle.0, ankle.1, 0.0)),
            (
                PoseLandmark::RightShoulder,
                Landmark::certain(rad.sin(), 1.0 - rad.cos(), 0.0),
            ),
            (PoseLandmark::LeftWrist, Landmark::certain(0.2, 0.5, 0.0)),
            (PoseLandmark::RightWrist, Landmark::certain(0.6, 0.5, 0.0)),
            (PoseLandmark::LeftHip, Landmark::certain(0.4, 1.0, 0.0)),
        ])
    }

    fn standing_frame(knee_bend: f64, sway: f64) -> Frame {
        // Leg bent by `knee_bend` degrees away from straight
        let bend = knee_bend.to_radians();
        let l = |x: f64, y: f64| Landmark::new(x + sway, y, 0.0, 0.9);
        frame_with(&[
            (PoseLandmark::RightShoulder, l(0.5, 0.2)),
            (PoseLandmark::RightElbow, l(0.55, 0.35)),
            (PoseLandmark::RightWrist, l(0.7, 0.4)),
            (PoseLandmark::LeftWrist, l(0.3, 0.4)),
            (PoseLandmark::RightHip, l(0.5, 0.5)),
            (PoseLandmark::LeftHip, l(0.4, 0.5)),
            (PoseLandmark::RightKnee, l(0.5, 0.7)),
            (PoseLandmark::RightAnkle, l(0.5 + 0.2 * bend.sin(), 0.7 + 0.2 * bend.cos())),
            (PoseLandmark::LeftKnee, l(0.4, 0.7)),
            (PoseLandmark::LeftAnkle, l(0.4, 0.9)),
        ])
    }

    #[test]
    fn test_empty_sequence() {
        let summary = extract_metrics(&[]);
        assert_eq!(summary.status(), SummaryStatus::Empty);
        assert!(summary.trick_phases.is_empty());
        assert!(summary.error.is_none());
    }

    #[test]
    fn test_all_low_confidence_is_degenerate() {
        let sequence = vec![Frame::default(); 10];
        let summary = extract_metrics(&sequence);

        assert!(summary.error.as_deref().is_some_and(|e| !e.is_empty()));
        assert!(summary.knee_angle_avg.is_none());
        assert!(summary.hip_angle_min.is_none());
        assert!(summary.arm_spread_avg.is_none());
        assert!(summary.knee_velocity_max.is_none());
        assert!(summary.frame_by_frame.is_empty());
        assert!(summary.trick_phases.is_empty());
    }

    #[test]
    fn test_glitch_angles_only_is_degenerate() {
        // Knee folded to ~11 degrees every frame
        let sequence: Vec<Frame> = (0..8)
            .map(|_| {
                frame_with(&[
                    (PoseLandmark::RightShoulder, Landmark::certain(0.0, 2.0, 0.0)),
                    (PoseLandmark::RightHip, Landmark::certain(0.0, 1.0, 0.0)),
                    (PoseLandmark::RightKnee, Landmark::certain(0.0, 0.0, 0.0)),
                    (PoseLandmark::RightAnkle, Landmark::certain(0.2, 1.0, 0.0)),
                ])
            })
            .collect();
        let summary = extract_metrics(&sequence);
        assert!(matches!(summary.status(), SummaryStatus::Degenerate(_)));
    }

    #[test]
    fn test_right_angle_fixture() {
        let sequence = vec![right_angle_frame(80.0, (1.0, 0.0)); 3];
        let aggregator = MetricsAggregator::default();
        let summary = aggregator.extract_metrics(&sequence);

        assert_eq!(summary.status(), SummaryStatus::Complete);
        for f in &summary.frame_by_frame {
            assert_eq!(f.right_knee_angle, Some(90.0));
            assert_eq!(f.right_hip_angle, Some(80.0));
        }
        assert_eq!(summary.knee_angle_avg, Some(90.0));
        assert_eq!(summary.knee_velocity_max, Some(0.0));
        assert_eq!(summary.knee_velocity_avg, Some(0.0));

        // 90 is not strictly below the compression threshold, the hip is
        assert!(summary.trick_phases.iter().all(|p| p.phase == Phase::HipHinge));
    }

    #[test]
    fn test_compression_depends_on_hip() {
        // Ankle lifted slightly: knee ~84 degrees
        let deep = vec![right_angle_frame(80.0, (1.0, 0.1)); 3];
        let summary = extract_metrics(&deep);
        assert!(summary.knee_angle_avg.unwrap() < 90.0);
        assert!(summary
            .trick_phases
            .iter()
            .all(|p| p.phase == Phase::DeepCompression));

        let knee_only = vec![right_angle_frame(120.0, (1.0, 0.1)); 3];
        let summary = extract_metrics(&knee_only);
        assert!(summary
            .trick_phases
            .iter()
            .all(|p| p.phase == Phase::KneeCompression));
    }

    #[test]
    fn test_series_lengths() {
        let sequence: Vec<Frame> = (0..12).map(|i| standing_frame(i as f64 * 5.0, 0.0)).collect();
        let aggregator = MetricsAggregator::default();
        let raw = aggregator.extract_series(&sequence);
        assert_eq!(raw.len(), 12);

        let smoothed = aggregator.smoother.smooth(&raw.right_knee);
        assert_eq!(smoothed.len(), 12);
        assert_eq!(knee_velocity(&smoothed).len(), 11);
        assert_eq!(knee_symmetry(&smoothed, &raw.left_knee).len(), 12);

        let summary = aggregator.extract_metrics(&sequence);
        assert_eq!(summary.frame_by_frame.len(), 12);
        assert_eq!(summary.trick_phases.len(), 12);
        for (i, p) in summary.trick_phases.iter().enumerate() {
            assert_eq!(p.frame, i);
        }
    }

    #[test]
    fn test_symmetry_and_velocity_default_to_zero() {
        let right = [Some(100.0), None, Some(120.0), Some(90.0)];
        let left = [Some(90.0), Some(100.0), None, Some(95.0)];
        assert_eq!(knee_symmetry(&right, &left), vec![10.0, 0.0, 0.0, 5.0]);
        assert_eq!(knee_velocity(&right), vec![0.0, 0.0, 30.0]);
        assert!(knee_velocity(&[Some(1.0)]).is_empty());
    }

    #[test]
    fn test_standing_sequence_statistics() {
        let sequence: Vec<Frame> = (0..20)
            .map(|i| standing_frame(0.0, if i % 2 == 0 { 0.01 } else { -0.01 }))
            .collect();
        let summary = extract_metrics(&sequence);

        let knee = summary.knee_angle_avg.unwrap();
        assert!(knee > 175.0, "knee {knee}");
        assert!(summary.knee_angle_min.unwrap() <= summary.knee_angle_max.unwrap());
        assert!((summary.arm_spread_avg.unwrap() - 0.4).abs() < 1e-9);
        assert!((summary.stance_width_avg.unwrap() - 0.1).abs() < 1e-9);
        assert!((summary.center_of_mass_x_avg.unwrap() - 0.45).abs() < 1e-9);
        assert!((summary.center_of_mass_x_std.unwrap() - 0.01).abs() < 1e-9);
        assert!(summary.knee_velocity_max.unwrap() < 1.0);
        assert!(summary.elbow_angle_avg.is_some());
        assert!(summary
            .trick_phases
            .iter()
            .all(|p| p.phase == Phase::Extended));
    }

    #[test]
    fn test_landing_detected() {
        // Straight, sudden compression, recovery
        let bends = [0.0, 0.0, 0.0, 0.0, 0.0, 60.0, 110.0, 110.0, 100.0, 60.0, 20.0, 0.0, 0.0, 0.0];
        let sequence: Vec<Frame> = bends.iter().map(|b| standing_frame(*b, 0.0)).collect();
        let summary = extract_metrics(&sequence);

        assert!(summary.knee_angle_min.unwrap() < 90.0);
        assert!(summary.knee_velocity_max.unwrap() > 20.0);
        assert!(summary.phase_count(Phase::Extended) >= 3);
        assert!(summary.trick_phases.iter().any(|p| p.phase.is_compression()));
        let impact = summary.hardest_impact_frame().unwrap();
        assert!((4..=11).contains(&impact));
    }

    #[test]
    fn test_statistics_ignore_timeline_rounding() {
        let sequence = vec![right_angle_frame(80.0, (1.0, 0.1)); 3];
        let summary = extract_metrics(&sequence);
        let avg = summary.knee_angle_avg.unwrap();
        assert!((avg - (90.0 - 0.1f64.atan().to_degrees())).abs() < 1e-4);

        let rounded = summary.frame_by_frame[0].right_knee_angle.unwrap();
        assert_eq!(rounded, round_to(avg, 2));
        assert_ne!(avg, rounded);
    }

    #[test]
    fn test_low_confidence_frames_are_gap_filled() {
        let weak = [0, 5, 6, 13];
        let sequence: Vec<Frame> = (0..16)
            .map(|i| {
                let mut frame = standing_frame(0.0, 0.0);
                if weak.contains(&i) {
                    frame
                        .set(PoseLandmark::RightAnkle, Landmark::new(0.5, 0.9, 0.0, 0.2))
                        .unwrap();
                }
                frame
            })
            .collect();

        let aggregator = MetricsAggregator::default();
        let raw = aggregator.extract_series(&sequence);
        for i in 0..16 {
            assert_eq!(raw.right_knee[i].is_none(), weak.contains(&i));
        }

        let summary = aggregator.extract_metrics(&sequence);
        assert_eq!(summary.status(), SummaryStatus::Complete);
        for f in &summary.frame_by_frame {
            let knee = f.right_knee_angle.unwrap();
            assert!(knee.is_finite() && knee > 175.0, "frame {} knee {knee}", f.frame);
        }
        for stat in [
            summary.knee_angle_avg,
            summary.knee_angle_min,
            summary.knee_symmetry_avg,
            summary.knee_velocity_avg,
            summary.knee_velocity_max,
        ] {
            assert!(stat.unwrap().is_finite());
        }
        assert!(summary.knee_velocity_max.unwrap() < 1.0);
        assert!(summary.trick_phases.iter().all(|p| p.phase != Phase::Unknown));
    }

    #[test]
    fn test_high_order_smoothing_keeps_constant_knee() {
        let mut config = MetricsConfig::default();
        config.smoothing.window = 51;
        config.smoothing.poly_order = 20;
        let aggregator = MetricsAggregator::new(config).unwrap();

        let sequence = vec![right_angle_frame(80.0, (1.0, 0.1)); 60];
        let summary = aggregator.extract_metrics(&sequence);
        let expected = extract_metrics(&sequence).knee_angle_avg.unwrap();
        assert!((expected - (90.0 - 0.1f64.atan().to_degrees())).abs() < 1e-4);
        assert!((summary.knee_angle_avg.unwrap() - expected).abs() < 1e-8);
        assert!((summary.knee_angle_max.unwrap() - expected).abs() < 1e-8);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = MetricsConfig::default();
        config.smoothing.window = 8;
        assert!(MetricsAggregator::new(config).is_err());
    }

    #[test]
    fn test_summary_json_shape() {
        let sequence = vec![right_angle_frame(120.0, (1.0, 0.0)); 4];
        let json = serde_json::to_value(extract_metrics(&sequence)).unwrap();
        assert!(json["knee_angle_avg"].is_f64());
        assert_eq!(json["trick_phases"][0]["phase"], "athletic_stance");
        assert_eq!(json["frame_by_frame"][3]["frame"], 3);
        assert!(json.get("error").is_none());
    }
}
