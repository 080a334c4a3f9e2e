//! Prompt templates and response parsing for model-backed coaching.

use redwings_metrics::MetricsSummary;
use serde_json::{json, Value};

use crate::coach::{CoachConfig, CoachError, CoachResult};
use crate::feedback::CoachingFeedback;
use crate::profile::AthleteProfile;

/// System prompt for the coaching model
pub const COACH_SYSTEM_PROMPT: &str = r#"You are a friendly, encouraging snowboarding coach with deep biomechanics knowledge.
Talk directly to the athlete like a real coach would: conversational, clear and motivating.
Avoid technical jargon where possible. Use plain language a rider would understand.
Be specific about what you saw in their video, not generic advice.
Keep each point concise, 1-3 sentences max per item.
Return ONLY valid JSON in the exact structure requested, with no extra text or markdown."#;

/// Instructions sent with every feedback request
pub const FEEDBACK_INSTRUCTIONS: &str = "Write like a real coach giving feedback after watching someone's video. Be encouraging but honest. Reference specific moments from the data (e.g. 'on your landings' or 'during the trick') rather than citing raw numbers.";

/// Shape the model must answer with
pub fn required_output_structure() -> Value {
    json!({
        "overall_assessment": "2-3 sentences. Start with something positive, then the main thing to work on.",
        "form_corrections": [
            "Correction 1: what you saw and how to fix it in plain language",
            "Correction 2",
            "Correction 3"
        ],
        "safety_warnings": [
            "Warning 1: conversational, not clinical",
            "Warning 2"
        ],
        "drills": [
            "Drill 1: name it, explain it simply, say why it helps",
            "Drill 2"
        ],
        "conditioning": "2-3 sentences on what to work on off the snow.",
        "motivation": "1 sentence of genuine encouragement specific to what they did well."
    })
}

/// User message payload: profile, metrics, instructions and output shape.
///
/// The per-frame timeline is left out; the model only sees aggregates and
/// the phase labels.
pub fn build_feedback_payload(profile: &AthleteProfile, metrics: &MetricsSummary) -> CoachResult<Value> {
    let mut metrics_value = serde_json::to_value(metrics).map_err(|e| CoachError::Internal(e.to_string()))?;
    if let Value::Object(map) = &mut metrics_value {
        map.remove("frame_by_frame");
    }

    let profile_value = serde_json::to_value(profile).map_err(|e| CoachError::Internal(e.to_string()))?;

    Ok(json!({
        "athlete_profile": profile_value,
        "biomechanical_metrics": metrics_value,
        "instructions": FEEDBACK_INSTRUCTIONS,
        "required_output_structure": required_output_structure(),
    }))
}

/// Chat completion request body for a JSON-mode model.
pub fn build_chat_request(
    config: &CoachConfig,
    profile: &AthleteProfile,
    metrics: &MetricsSummary,
) -> CoachResult<Value> {
    let payload = build_feedback_payload(profile, metrics)?;
    let user_content =
        serde_json::to_string_pretty(&payload).map_err(|e| CoachError::Internal(e.to_string()))?;

    Ok(json!({
        "model": config.model,
        "temperature": config.temperature,
        "max_tokens": config.max_tokens,
        "messages": [
            { "role": "system", "content": COACH_SYSTEM_PROMPT },
            { "role": "user", "content": user_content },
        ],
        "response_format": { "type": "json_object" },
    }))
}

/// Parse a model reply into feedback.
///
/// Anything that is not a JSON object of the requested shape becomes
/// [`CoachError::InvalidResponse`] carrying the raw text.
pub fn parse_feedback(raw: &str) -> CoachResult<CoachingFeedback> {
    let trimmed = strip_code_fence(raw.trim());
    serde_json::from_str(trimmed).map_err(|e| CoachError::InvalidResponse {
        reason: e.to_string(),
        raw_response: raw.to_string(),
    })
}

// Models sometimes wrap JSON in a markdown fence despite instructions.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
