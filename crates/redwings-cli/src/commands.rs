//! Subcommand arguments and handlers.

use anyhow::{Context, Result};
use clap::Args;
use redwings_coach::{AnalysisPipeline, AthleteProfile, RuleBasedCoach, ServiceConfig};
use redwings_core::Sequence;
use redwings_metrics::MetricsAggregator;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Arguments for `redwings analyze`
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Landmark file: JSON array of frames, each 33 rows of [x, y, z, confidence]
    pub input: PathBuf,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the summary here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Arguments for `redwings coach`
#[derive(Args, Debug)]
pub struct CoachArgs {
    /// Landmark file: JSON array of frames, each 33 rows of [x, y, z, confidence]
    pub input: PathBuf,

    /// Athlete profile JSON
    #[arg(short, long)]
    pub profile: PathBuf,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn analyze(args: AnalyzeArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let sequence = load_sequence(&args.input).await?;

    let aggregator = MetricsAggregator::new(config.metrics).context("invalid metrics configuration")?;
    let summary = aggregator.extract_metrics(&sequence);
    if let Some(error) = &summary.error {
        tracing::warn!("{}", error);
    }

    write_json(&summary, args.pretty, args.output.as_deref()).await
}

pub async fn coach(args: CoachArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let sequence = load_sequence(&args.input).await?;
    let profile = load_profile(&args.profile).await?;

    let coach = Arc::new(RuleBasedCoach::new(config.rules));
    let pipeline = AnalysisPipeline::new(&config, coach)?;
    let report = pipeline.analyze_sequence(sequence, profile).await?;

    tracing::info!("Analysis {} finished", report.analysis_id);
    write_json(&report, args.pretty, args.output.as_deref()).await
}

/// File settings (if given) layered under `REDWINGS_` environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig> {
    let config = match path {
        Some(path) => {
            let path = path.to_str().context("configuration path is not valid UTF-8")?;
            ServiceConfig::from_file(path)?
        }
        None => ServiceConfig::from_env()?,
    };
    Ok(config)
}

pub async fn load_sequence(path: &Path) -> Result<Sequence> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let sequence: Sequence = serde_json::from_slice(&bytes)
        .with_context(|| format!("{} is not a (frames, 33, 4) landmark array", path.display()))?;
    tracing::debug!("Loaded {} frames from {}", sequence.len(), path.display());
    Ok(sequence)
}

pub async fn load_profile(path: &Path) -> Result<AthleteProfile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let profile: AthleteProfile =
        serde_json::from_slice(&bytes).with_context(|| format!("invalid athlete profile in {}", path.display()))?;
    Ok(profile)
}

async fn write_json<T: Serialize>(value: &T, pretty: bool, output: Option<&Path>) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    match output {
        Some(path) => tokio::fs::write(path, json)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", json),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("redwings-cli-{}-{}", std::process::id(), name))
    }

    fn landmark_file(frames: usize) -> String {
        let mut rows = vec![[0.5, 0.5, 0.0, 0.9]; 33];
        // hip, knee, ankle on both sides: knee near 84 degrees
        for (hip, knee, ankle) in [(23, 25, 27), (24, 26, 28)] {
            rows[hip] = [0.0, 1.0, 0.0, 0.9];
            rows[knee] = [0.0, 0.0, 0.0, 0.9];
            rows[ankle] = [1.0, 0.1, 0.0, 0.9];
        }
        // shoulders keep the hip angle well defined
        rows[11] = [0.5, 1.5, 0.0, 0.9];
        rows[12] = [0.5, 1.5, 0.0, 0.9];
        serde_json::to_string(&vec![rows; frames]).unwrap()
    }

    #[tokio::test]
    async fn test_load_sequence() {
        let path = temp_path("seq.json");
        tokio::fs::write(&path, landmark_file(4)).await.unwrap();

        let sequence = load_sequence(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.ok();
        assert_eq!(sequence.len(), 4);
    }

    #[tokio::test]
    async fn test_load_sequence_rejects_short_frames() {
        let path = temp_path("short.json");
        tokio::fs::write(&path, "[[[0.1, 0.2, 0.0, 0.9]]]").await.unwrap();

        let result = load_sequence(&path).await;
        tokio::fs::remove_file(&path).await.ok();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_analyze_writes_summary() {
        let input = temp_path("analyze-in.json");
        let output = temp_path("analyze-out.json");
        tokio::fs::write(&input, landmark_file(6)).await.unwrap();

        analyze(AnalyzeArgs {
            input: input.clone(),
            config: None,
            output: Some(output.clone()),
            pretty: true,
        })
        .await
        .unwrap();

        let summary: Value = serde_json::from_slice(&tokio::fs::read(&output).await.unwrap()).unwrap();
        tokio::fs::remove_file(&input).await.ok();
        tokio::fs::remove_file(&output).await.ok();

        assert_eq!(summary["frame_by_frame"].as_array().unwrap().len(), 6);
        assert!(summary["knee_angle_min"].as_f64().unwrap() < 90.0);
        assert!(summary.get("error").is_none());
    }

    #[tokio::test]
    async fn test_coach_writes_report() {
        let input = temp_path("coach-in.json");
        let profile = temp_path("coach-profile.json");
        let output = temp_path("coach-out.json");
        tokio::fs::write(&input, landmark_file(6)).await.unwrap();
        tokio::fs::write(
            &profile,
            r#"{"sport": "Snowboarding", "skill_level": "Beginner", "age": 19,
                "height_cm": 175, "weight_kg": 70, "fatigue_level": 3}"#,
        )
        .await
        .unwrap();

        coach(CoachArgs {
            input: input.clone(),
            profile: profile.clone(),
            config: None,
            output: Some(output.clone()),
            pretty: false,
        })
        .await
        .unwrap();

        let report: Value = serde_json::from_slice(&tokio::fs::read(&output).await.unwrap()).unwrap();
        for path in [&input, &profile, &output] {
            tokio::fs::remove_file(path).await.ok();
        }

        assert_eq!(report["profile"]["skill_level"], "Beginner");
        assert!(report["coaching"]["form_corrections"].as_array().unwrap().len() >= 1);
        assert!(report["analysis_id"].is_string());
    }
}
