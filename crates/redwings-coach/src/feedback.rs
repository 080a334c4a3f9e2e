//! Coaching feedback record and the deterministic rule-based coach.

use async_trait::async_trait;
use redwings_metrics::{MetricsSummary, Phase};
use serde::{Deserialize, Serialize};

use crate::coach::{CoachResult, FeedbackGenerator};
use crate::profile::{AthleteProfile, SkillLevel};

/// Structured coaching feedback
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoachingFeedback {
    pub overall_assessment: String,
    pub form_corrections: Vec<String>,
    pub safety_warnings: Vec<String>,
    pub drills: Vec<String>,
    pub conditioning: String,
    pub motivation: String,
}

/// Thresholds the rule-based coach reacts to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoachThresholds {
    /// Landing knee angle above this reads as stiff-legged
    pub stiff_knee_deg: f64,
    /// Knee angle below this is a very deep compression
    pub deep_knee_deg: f64,
    /// Hip angle below this is excessive waist bend
    pub waist_bend_hip_deg: f64,
    /// Mean left/right knee difference worth flagging
    pub symmetry_flag_deg: f64,
    /// Knee velocity (deg/frame) treated as a hard impact
    pub impact_velocity: f64,
    /// Center of mass x std-dev treated as unstable
    pub sway_std: f64,
    /// Arm spread below this means arms held in
    pub narrow_arms: f64,
}

impl Default for CoachThresholds {
    fn default() -> Self {
        Self {
            stiff_knee_deg: 120.0,
            deep_knee_deg: 60.0,
            waist_bend_hip_deg: 90.0,
            symmetry_flag_deg: 20.0,
            impact_velocity: 40.0,
            sway_std: 0.05,
            narrow_arms: 0.15,
        }
    }
}

/// Coach that derives feedback directly from the metrics.
///
/// Used when no language model is configured and as the reference generator
/// in tests.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedCoach {
    thresholds: CoachThresholds,
}

impl RuleBasedCoach {
    pub fn new(thresholds: CoachThresholds) -> Self {
        Self { thresholds }
    }

    pub fn feedback(&self, profile: &AthleteProfile, metrics: &MetricsSummary) -> CoachingFeedback {
        let t = &self.thresholds;
        let mut corrections = Vec::new();
        let mut drills = Vec::new();
        let mut warnings = Vec::new();

        if metrics.knee_angle_min.is_some_and(|k| k > t.stiff_knee_deg) {
            corrections.push(
                "You're landing pretty stiff-legged. Let your knees soak up the impact like springs instead of locking them out."
                    .to_string(),
            );
            drills.push(
                "Box landings: jump off a low step and land as quietly as you can. Quiet landings mean your legs are absorbing the hit."
                    .to_string(),
            );
        }
        if metrics.hip_angle_min.is_some_and(|h| h < t.waist_bend_hip_deg) {
            corrections.push(
                "You're folding at the waist a lot. Keep your chest up and bend more through the knees so your weight stays over the board."
                    .to_string(),
            );
        }
        if metrics.knee_symmetry_avg.is_some_and(|s| s > t.symmetry_flag_deg) {
            corrections.push(
                "One leg is doing more of the work than the other. Try to load both knees evenly through the landing."
                    .to_string(),
            );
            drills.push(
                "Single-leg squats on each side, matching the depth on your weaker leg to your stronger one.".to_string(),
            );
        }
        if metrics.center_of_mass_x_std.is_some_and(|s| s > t.sway_std) {
            corrections.push(
                "Your body is drifting side to side. Pick a spot ahead of you and keep your hips stacked over the middle of the board."
                    .to_string(),
            );
            drills.push(
                "Balance board holds: two minutes in your riding stance with your eyes on a fixed point.".to_string(),
            );
        }
        if metrics.arm_spread_avg.is_some_and(|a| a < t.narrow_arms) && metrics.phase_count(Phase::ArmsTucked) == 0 {
            corrections.push(
                "Your arms are staying pretty tight to your body. Use them for balance by keeping them relaxed and a little out from your sides."
                    .to_string(),
            );
        }
        if corrections.is_empty() {
            corrections.push(
                "Your form looks solid. Keep focusing on a smooth, controlled landing and a quiet upper body.".to_string(),
            );
        }
        if drills.is_empty() {
            drills.push(
                "Flat-ground ollies: ten in a row focusing on the same knee bend on takeoff and landing.".to_string(),
            );
        }

        if let Some(velocity) = metrics.knee_velocity_max.filter(|v| *v > t.impact_velocity) {
            let moment = metrics
                .hardest_impact_frame()
                .map(|frame| format!(" around frame {}", frame))
                .unwrap_or_default();
            warnings.push(format!(
                "One landing{} hit hard ({:.0} degrees of knee change in a single frame). That's a lot of shock going through your knees.",
                moment, velocity
            ));
        }
        if metrics.knee_angle_min.is_some_and(|k| k < t.deep_knee_deg) {
            warnings.push(
                "You're dropping really deep into your knees at times. That's a lot of load on the joint, so build strength before going bigger."
                    .to_string(),
            );
        }
        if let Some(injuries) = profile.injuries() {
            warnings.push(format!(
                "With your history ({}), warm up properly and stop if anything feels off.",
                injuries
            ));
        }
        if profile.is_fatigued() {
            warnings.push(
                "You rated your fatigue high. Tired legs land stiff, so keep the session short.".to_string(),
            );
        }

        CoachingFeedback {
            overall_assessment: self.assessment(profile, metrics, &corrections),
            form_corrections: corrections,
            safety_warnings: warnings,
            drills,
            conditioning: conditioning(profile),
            motivation: self.motivation(metrics),
        }
    }

    fn assessment(&self, profile: &AthleteProfile, metrics: &MetricsSummary, corrections: &[String]) -> String {
        let positive = if metrics.phase_count(Phase::Extended) > 0 {
            "You're getting full extension in the air, which is great to see."
        } else if metrics.phase_count(Phase::AthleticStance) > metrics.frame_count() / 2 {
            "You hold a nice athletic stance for most of the run."
        } else {
            "Good commitment throughout the clip."
        };
        let focus = corrections
            .first()
            .and_then(|c| c.split('.').next())
            .unwrap_or("Keep building consistency");
        let dominant = metrics
            .dominant_phase()
            .map(|phase| format!(" Most of the clip reads as: {}.", phase.description().to_lowercase()))
            .unwrap_or_default();
        format!(
            "{} Main thing to work on as a {} rider at {} level: {}.{}",
            positive,
            profile.sport.name().to_lowercase(),
            skill_label(profile.skill_level),
            focus.to_lowercase(),
            dominant
        )
    }

    fn motivation(&self, metrics: &MetricsSummary) -> String {
        if metrics.phase_count(Phase::DeepCompression) + metrics.phase_count(Phase::KneeCompression) > 0 {
            "You're already absorbing your landings, keep sending it!".to_string()
        } else {
            "Every session builds on the last, keep sending it!".to_string()
        }
    }
}

fn skill_label(level: SkillLevel) -> &'static str {
    match level {
        SkillLevel::Beginner => "beginner",
        SkillLevel::Intermediate => "intermediate",
        SkillLevel::Advanced => "advanced",
        SkillLevel::Pro => "pro",
    }
}

fn conditioning(profile: &AthleteProfile) -> String {
    let base = "Work on leg strength with squats and lunges, and add core work like planks to keep your upper body quiet.";
    if profile.age >= 40 {
        format!("{} Give yourself extra recovery between sessions and keep up mobility work for your hips and knees.", base)
    } else if profile.sport.is_board_sport() {
        format!("{} Single-leg balance work will carry straight over to the board.", base)
    } else {
        base.to_string()
    }
}

#[async_trait]
impl FeedbackGenerator for RuleBasedCoach {
    fn name(&self) -> &str {
        "rule-based"
    }

    async fn generate(&self, profile: &AthleteProfile, metrics: &MetricsSummary) -> CoachResult<CoachingFeedback> {
        tracing::debug!("Generating rule-based feedback for {} frames", metrics.frame_count());
        Ok(self.feedback(profile, metrics))
    }
}
