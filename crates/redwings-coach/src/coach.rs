//! Feedback generator trait and common types.

use async_trait::async_trait;
use redwings_metrics::MetricsSummary;
use serde::{Deserialize, Serialize};

use crate::feedback::CoachingFeedback;
use crate::profile::AthleteProfile;

/// Result type for coaching operations
pub type CoachResult<T> = Result<T, CoachError>;

/// Coaching pipeline error types
#[derive(Debug, thiserror::Error)]
pub enum CoachError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid athlete profile: {0}")]
    InvalidProfile(String),

    #[error("Unprocessable video: {0}")]
    Unprocessable(String),

    #[error("Pose estimation error: {0}")]
    PoseEstimation(String),

    #[error("LLM inference error: {0}")]
    LlmError(String),

    #[error("Invalid JSON from model: {reason}")]
    InvalidResponse { reason: String, raw_response: String },

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Core(#[from] redwings_core::Error),
}

impl From<config::ConfigError> for CoachError {
    fn from(e: config::ConfigError) -> Self {
        CoachError::Config(e.to_string())
    }
}

/// Produces coaching feedback from an athlete profile and metrics summary.
///
/// Implementations backed by a remote language model send the payload from
/// [`crate::prompts::build_chat_request`] and parse the reply with
/// [`crate::prompts::parse_feedback`].
#[async_trait]
pub trait FeedbackGenerator: Send + Sync {
    /// Generator name/identifier
    fn name(&self) -> &str;

    async fn generate(
        &self,
        profile: &AthleteProfile,
        metrics: &MetricsSummary,
    ) -> CoachResult<CoachingFeedback>;
}

/// Language model settings for feedback generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoachConfig {
    /// Model to use (e.g., "gpt-4o-mini")
    pub model: String,
    /// Temperature for generation (0.0-1.0)
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// Timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 1024,
            timeout_ms: 30_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coach_config_default() {
        let config = CoachConfig::default();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeout_ms, 30_000);
    }

    #[test]
    fn test_error_display() {
        let err = CoachError::InvalidResponse {
            reason: "expected value".to_string(),
            raw_response: "not json".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid JSON from model: expected value");
        assert_eq!(CoachError::Timeout(250).to_string(), "Timeout after 250ms");
    }
}
