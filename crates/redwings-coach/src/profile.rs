//! Athlete profile submitted alongside a video.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::coach::{CoachError, CoachResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sport {
    Snowboarding,
    Skateboarding,
    #[serde(rename = "BMX")]
    Bmx,
    Skiing,
    Parkour,
    Surfing,
    Motocross,
    #[serde(rename = "Rock Climbing")]
    RockClimbing,
    Wingsuiting,
    Other,
}

impl Sport {
    pub fn name(&self) -> &'static str {
        match self {
            Sport::Snowboarding => "Snowboarding",
            Sport::Skateboarding => "Skateboarding",
            Sport::Bmx => "BMX",
            Sport::Skiing => "Skiing",
            Sport::Parkour => "Parkour",
            Sport::Surfing => "Surfing",
            Sport::Motocross => "Motocross",
            Sport::RockClimbing => "Rock Climbing",
            Sport::Wingsuiting => "Wingsuiting",
            Sport::Other => "Other",
        }
    }

    /// Sports ridden on a board or skis, where stance width matters.
    pub fn is_board_sport(&self) -> bool {
        matches!(
            self,
            Sport::Snowboarding | Sport::Skateboarding | Sport::Skiing | Sport::Surfing
        )
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
    Pro,
}

/// Athlete profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteProfile {
    pub sport: Sport,
    pub skill_level: SkillLevel,
    pub age: u32,
    pub height_cm: f64,
    pub weight_kg: f64,
    /// Self-reported fatigue, 1 (fresh) to 10 (exhausted)
    pub fatigue_level: u8,
    #[serde(default = "no_injuries")]
    pub injury_history: String,
}

fn no_injuries() -> String {
    "None".to_string()
}

impl AthleteProfile {
    pub const AGE_RANGE: std::ops::RangeInclusive<u32> = 10..=80;
    pub const FATIGUE_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

    pub fn validate(&self) -> CoachResult<()> {
        if !Self::AGE_RANGE.contains(&self.age) {
            return Err(CoachError::InvalidProfile(format!(
                "age must be between {} and {}, got {}",
                Self::AGE_RANGE.start(),
                Self::AGE_RANGE.end(),
                self.age
            )));
        }
        if !Self::FATIGUE_RANGE.contains(&self.fatigue_level) {
            return Err(CoachError::InvalidProfile(format!(
                "fatigue_level must be between 1 and 10, got {}",
                self.fatigue_level
            )));
        }
        if !(self.height_cm.is_finite() && self.height_cm > 0.0) {
            return Err(CoachError::InvalidProfile("height_cm must be positive".to_string()));
        }
        if !(self.weight_kg.is_finite() && self.weight_kg > 0.0) {
            return Err(CoachError::InvalidProfile("weight_kg must be positive".to_string()));
        }
        Ok(())
    }

    /// Injury history if the athlete reported any.
    pub fn injuries(&self) -> Option<&str> {
        let history = self.injury_history.trim();
        if history.is_empty() || history.eq_ignore_ascii_case("none") {
            None
        } else {
            Some(history)
        }
    }

    pub fn is_fatigued(&self) -> bool {
        self.fatigue_level >= 7
    }
}

#[cfg(test)]
pub(crate) fn sample_profile() -> AthleteProfile {
    AthleteProfile {
        sport: Sport::Snowboarding,
        skill_level: SkillLevel::Intermediate,
        age: 24,
        height_cm: 178.0,
        weight_kg: 72.5,
        fatigue_level: 4,
        injury_history: "None".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_profile() {
        assert!(sample_profile().validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range() {
        let mut profile = sample_profile();
        profile.age = 7;
        assert!(matches!(profile.validate(), Err(CoachError::InvalidProfile(_))));

        let mut profile = sample_profile();
        profile.fatigue_level = 11;
        assert!(profile.validate().is_err());

        let mut profile = sample_profile();
        profile.weight_kg = 0.0;
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_deserialize_form_fields() {
        let json = r#"{
            "sport": "BMX",
            "skill_level": "Pro",
            "age": 31,
            "height_cm": 170.2,
            "weight_kg": 68.0,
            "fatigue_level": 8
        }"#;
        let profile: AthleteProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.sport, Sport::Bmx);
        assert_eq!(profile.skill_level, SkillLevel::Pro);
        assert_eq!(profile.injury_history, "None");
        assert!(profile.injuries().is_none());
        assert!(profile.is_fatigued());
    }

    #[test]
    fn test_injuries() {
        let mut profile = sample_profile();
        profile.injury_history = "  torn ACL (2022) ".to_string();
        assert_eq!(profile.injuries(), Some("torn ACL (2022)"));
    }
}
