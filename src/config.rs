//! Runtime settings read from the environment (after `.env` is loaded).

use crate::presentation::LabelPolicy;
use anyhow::{anyhow, Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_MODEL_FILE: &str = "mental_health_sentiment_model.json";
pub const DEFAULT_VECTORIZER_FILE: &str = "tfidf_vectorizer.json";
pub const DEFAULT_SCALER_FILE: &str = "scaler.json";

#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub vectorizer: PathBuf,
    pub scaler: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub artifacts: ArtifactPaths,
    pub policy: LabelPolicy,
    pub static_dir: PathBuf,
    /// Request body cap in bytes; unset means no cap
    pub max_input_bytes: Option<usize>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr: SocketAddr = get("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse()
            .context("BIND_ADDR must be host:port")?;

        let artifact_dir = PathBuf::from(get("ARTIFACT_DIR").unwrap_or_else(|| "models".to_string()));
        let artifacts = ArtifactPaths {
            model: get("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| artifact_dir.join(DEFAULT_MODEL_FILE)),
            vectorizer: get("VECTORIZER_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| artifact_dir.join(DEFAULT_VECTORIZER_FILE)),
            scaler: get("SCALER_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| artifact_dir.join(DEFAULT_SCALER_FILE)),
        };

        let policy: LabelPolicy = get("LABEL_POLICY")
            .unwrap_or_else(|| "sentiment".to_string())
            .parse()
            .map_err(|e: String| anyhow!(e))
            .context("invalid LABEL_POLICY")?;

        let static_dir = PathBuf::from(get("STATIC_DIR").unwrap_or_else(|| "static".to_string()));

        let max_input_bytes = get("MAX_INPUT_BYTES")
            .map(|v| v.trim().parse::<usize>())
            .transpose()
            .context("MAX_INPUT_BYTES must be a byte count")?;

        Ok(Settings {
            bind_addr,
            artifacts,
            policy,
            static_dir,
            max_input_bytes,
        })
    }
}
