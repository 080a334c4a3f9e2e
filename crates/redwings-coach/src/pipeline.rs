//! End-to-end analysis: video to landmarks to metrics to coaching.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redwings_core::{Frame, Sequence};
use redwings_metrics::{MetricsAggregator, MetricsSummary, SummaryStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::coach::{CoachError, CoachResult, FeedbackGenerator};
use crate::config::{RequestLimits, ServiceConfig};
use crate::feedback::CoachingFeedback;
use crate::profile::AthleteProfile;

/// Uploaded video
#[derive(Debug, Clone)]
pub struct VideoInput {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl VideoInput {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// Turns a video into a landmark sequence.
///
/// Frame sampling and model selection belong to the implementation.
#[async_trait]
pub trait PoseEstimator: Send + Sync {
    async fn estimate(&self, video: &VideoInput) -> CoachResult<Sequence>;

    /// Release model resources
    async fn close(&self) -> CoachResult<()> {
        Ok(())
    }
}

/// Analysis result returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub analysis_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub profile: AthleteProfile,
    pub metrics: MetricsSummary,
    pub coaching: CoachingFeedback,
}

/// Runs pose estimation, metric extraction and feedback generation
pub struct AnalysisPipeline {
    aggregator: MetricsAggregator,
    coach: Arc<dyn FeedbackGenerator>,
    estimator: Option<Arc<dyn PoseEstimator>>,
    limits: RequestLimits,
    feedback_timeout: Duration,
}

impl AnalysisPipeline {
    pub fn new(config: &ServiceConfig, coach: Arc<dyn FeedbackGenerator>) -> CoachResult<Self> {
        config.validate()?;
        Ok(Self {
            aggregator: MetricsAggregator::new(config.metrics.clone())?,
            coach,
            estimator: None,
            limits: config.limits.clone(),
            feedback_timeout: Duration::from_millis(config.coach.timeout_ms),
        })
    }

    pub fn with_estimator(mut self, estimator: Arc<dyn PoseEstimator>) -> Self {
        self.estimator = Some(estimator);
        self
    }

    /// Analyze an uploaded video.
    pub async fn analyze(&self, video: &VideoInput, profile: AthleteProfile) -> CoachResult<AnalysisReport> {
        self.check_video(video)?;
        profile.validate()?;

        let estimator = self
            .estimator
            .as_ref()
            .ok_or_else(|| CoachError::PoseEstimation("no pose estimator configured".to_string()))?;

        tracing::info!(
            "Estimating pose for {} ({} bytes)",
            video.file_name,
            video.bytes.len()
        );
        let sequence = estimator.estimate(video).await?;

        self.run(sequence, profile).await
    }

    /// Analyze an already extracted landmark sequence.
    pub async fn analyze_sequence(&self, sequence: Sequence, profile: AthleteProfile) -> CoachResult<AnalysisReport> {
        profile.validate()?;
        self.run(sequence, profile).await
    }

    /// Metrics only, without feedback generation.
    pub async fn metrics(&self, sequence: Sequence) -> CoachResult<MetricsSummary> {
        self.check_frames(&sequence)?;
        let aggregator = self.aggregator.clone();
        tokio::task::spawn_blocking(move || aggregator.extract_metrics(&sequence))
            .await
            .map_err(|e| CoachError::Internal(e.to_string()))
    }

    /// Release the pose estimator.
    pub async fn shutdown(&self) -> CoachResult<()> {
        match &self.estimator {
            Some(estimator) => estimator.close().await,
            None => Ok(()),
        }
    }

    async fn run(&self, sequence: Sequence, profile: AthleteProfile) -> CoachResult<AnalysisReport> {
        let analysis_id = Uuid::new_v4();
        tracing::info!("Analysis {}: {} frames", analysis_id, sequence.len());

        let metrics = self.metrics(sequence).await?;
        match metrics.status() {
            SummaryStatus::Empty => {
                return Err(CoachError::Unprocessable("no frames with a detected pose".to_string()));
            }
            SummaryStatus::Degenerate(message) => {
                tracing::warn!("Analysis {}: {}", analysis_id, message);
                return Err(CoachError::Unprocessable(message.to_string()));
            }
            SummaryStatus::Complete => {}
        }

        tracing::debug!(
            "Analysis {}: knee min {:?}, max velocity {:?}",
            analysis_id,
            metrics.knee_angle_min,
            metrics.knee_velocity_max
        );

        let coaching = tokio::time::timeout(self.feedback_timeout, self.coach.generate(&profile, &metrics))
            .await
            .map_err(|_| CoachError::Timeout(self.feedback_timeout.as_millis() as u64))??;

        tracing::info!(
            "Analysis {} complete: {} corrections from {}",
            analysis_id,
            coaching.form_corrections.len(),
            self.coach.name()
        );

        Ok(AnalysisReport {
            analysis_id,
            generated_at: Utc::now(),
            profile,
            metrics,
            coaching,
        })
    }

    fn check_video(&self, video: &VideoInput) -> CoachResult<()> {
        if !video.content_type.starts_with(&self.limits.content_type_prefix) {
            return Err(CoachError::InvalidInput(format!(
                "file must be a video, got content type '{}'",
                video.content_type
            )));
        }
        if video.bytes.is_empty() {
            return Err(CoachError::InvalidInput("video is empty".to_string()));
        }
        if video.bytes.len() > self.limits.max_upload_bytes {
            return Err(CoachError::InvalidInput(format!(
                "video exceeds {} bytes",
                self.limits.max_upload_bytes
            )));
        }
        Ok(())
    }

    fn check_frames(&self, sequence: &[Frame]) -> CoachResult<()> {
        if sequence.len() > self.limits.max_frames {
            return Err(CoachError::InvalidInput(format!(
                "{} frames exceeds the limit of {}",
                sequence.len(),
                self.limits.max_frames
            )));
        }
        Ok(())
    }
}
