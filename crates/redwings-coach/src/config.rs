//! Service configuration.

use redwings_core::MetricsConfig;
use serde::{Deserialize, Serialize};

use crate::coach::{CoachConfig, CoachError, CoachResult};
use crate::feedback::CoachThresholds;

const ENV_PREFIX: &str = "REDWINGS";

/// Complete analysis service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Metric extraction thresholds
    pub metrics: MetricsConfig,

    /// Feedback model settings
    pub coach: CoachConfig,

    /// Rule-based coach thresholds
    pub rules: CoachThresholds,

    /// Request limits
    pub limits: RequestLimits,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestLimits {
    /// Maximum frames accepted from the pose estimator
    pub max_frames: usize,

    /// Maximum video upload size (bytes)
    pub max_upload_bytes: usize,

    /// Accepted content type prefix
    pub content_type_prefix: String,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_frames: 10_000,
            max_upload_bytes: 200 * 1024 * 1024, // 200MB
            content_type_prefix: "video/".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from file, with environment overrides
    pub fn from_file(path: &str) -> CoachResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(environment())
            .build()?;

        settings.try_deserialize::<Self>()?.validated()
    }

    /// Load from environment variables
    pub fn from_env() -> CoachResult<Self> {
        let settings = config::Config::builder().add_source(environment()).build()?;

        settings.try_deserialize::<Self>()?.validated()
    }

    pub fn validate(&self) -> CoachResult<()> {
        self.metrics.validate()?;
        if self.coach.timeout_ms == 0 {
            return Err(CoachError::Config("coach.timeout_ms must be positive".to_string()));
        }
        if self.limits.max_frames == 0 {
            return Err(CoachError::Config("limits.max_frames must be positive".to_string()));
        }
        Ok(())
    }

    fn validated(self) -> CoachResult<Self> {
        self.validate()?;
        Ok(self)
    }
}

// REDWINGS_METRICS__GLITCH_FLOOR_DEG=30 overrides metrics.glitch_floor_deg
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
