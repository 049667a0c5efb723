//! One request's pipeline: validate, clean, predict, map to display result.

use crate::inference::{Artifacts, InferenceError, PredictedLabel};
use crate::normalize::clean_text;
use crate::presentation::{DisplayResult, LabelPolicy};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

pub const EMPTY_INPUT_MESSAGE: &str = "Please enter some text to analyze.";

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("{}", EMPTY_INPUT_MESSAGE)]
    EmptyInput,
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Analysis {
    pub id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub policy: LabelPolicy,
    /// Input after cleaning, as fed to the vectorizer
    pub cleaned_text: String,
    /// Raw classifier output
    #[schema(value_type = Object)]
    pub predicted_label: PredictedLabel,
    pub result: DisplayResult,
}

/// Runs the pipeline once. Whitespace-only input is rejected before any
/// inference call.
pub fn analyze(artifacts: &Artifacts, policy: LabelPolicy, raw: &str) -> Result<Analysis, AnalyzeError> {
    if raw.trim().is_empty() {
        warn!("⚠️ Rejected empty input");
        return Err(AnalyzeError::EmptyInput);
    }

    let id = Uuid::new_v4();
    let cleaned = clean_text(raw);
    let label = artifacts.predict(&cleaned)?;
    let result = policy.display(&label);

    info!(
        "🧠 Analysis {}: predicted {:?} -> {} ({})",
        id,
        label.to_string(),
        result.bucket,
        policy
    );

    Ok(Analysis {
        id,
        analyzed_at: Utc::now(),
        policy,
        cleaned_text: cleaned,
        predicted_label: label,
        result,
    })
}
