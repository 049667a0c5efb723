//! Inference chain: cleaned text -> features -> scaled features -> label.
//!
//! The three stages sit behind traits so the loaded artifacts can be swapped
//! for test doubles. [`Artifacts`] is built once at startup and shared
//! read-only between requests.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("dimension mismatch in {stage}: expected {expected}, got {actual}")]
    DimensionMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("classifier returned no prediction")]
    EmptyPrediction,
    #[error("{0}")]
    Artifact(String),
}

pub type InferenceResult<T> = Result<T, InferenceError>;

/// Sparse row vector with entries sorted by column index.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseVector {
    dim: usize,
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            entries: Vec::new(),
        }
    }

    /// Builds a vector from unordered entries. Duplicate columns are summed,
    /// zeros dropped.
    pub fn from_entries(dim: usize, mut entries: Vec<(usize, f64)>) -> InferenceResult<Self> {
        if let Some(&(col, _)) = entries.iter().find(|(col, _)| *col >= dim) {
            return Err(InferenceError::DimensionMismatch {
                stage: "sparse vector",
                expected: dim,
                actual: col + 1,
            });
        }
        entries.sort_by_key(|(col, _)| *col);
        let mut merged: Vec<(usize, f64)> = Vec::with_capacity(entries.len());
        for (col, value) in entries {
            match merged.last_mut() {
                Some((last, acc)) if *last == col => *acc += value,
                _ => merged.push((col, value)),
            }
        }
        merged.retain(|(_, v)| *v != 0.0);
        Ok(Self { dim, entries: merged })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn map_values<F>(mut self, mut f: F) -> Self
    where
        F: FnMut(usize, f64) -> f64,
    {
        for (col, value) in self.entries.iter_mut() {
            *value = f(*col, *value);
        }
        self.entries.retain(|(_, v)| *v != 0.0);
        self
    }

    /// Dot product with a dense row.
    pub fn dot(&self, dense: &[f64]) -> InferenceResult<f64> {
        if dense.len() != self.dim {
            return Err(InferenceError::DimensionMismatch {
                stage: "dot product",
                expected: dense.len(),
                actual: self.dim,
            });
        }
        Ok(self.entries.iter().map(|(col, v)| dense[*col] * v).sum())
    }
}

/// Raw classifier output. The artifact's `classes` decide which variant
/// comes back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictedLabel {
    Index(i64),
    Text(String),
}

impl PredictedLabel {
    pub fn kind(&self) -> LabelKind {
        match self {
            PredictedLabel::Index(_) => LabelKind::Index,
            PredictedLabel::Text(_) => LabelKind::Text,
        }
    }
}

impl fmt::Display for PredictedLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictedLabel::Index(i) => write!(f, "{}", i),
            PredictedLabel::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    Index,
    Text,
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelKind::Index => f.write_str("integer"),
            LabelKind::Text => f.write_str("text"),
        }
    }
}

pub trait Vectorizer: Send + Sync {
    fn transform(&self, text: &str) -> InferenceResult<SparseVector>;

    /// Number of feature columns.
    fn dim(&self) -> usize;
}

pub trait Scaler: Send + Sync {
    fn transform(&self, features: SparseVector) -> InferenceResult<SparseVector>;
}

pub trait Classifier: Send + Sync {
    /// Predicts one label per input row; callers pass a single row.
    fn predict(&self, features: &SparseVector) -> InferenceResult<Vec<PredictedLabel>>;

    fn classes(&self) -> Vec<PredictedLabel>;
}

/// Loaded, immutable inference context.
pub struct Artifacts {
    vectorizer: Box<dyn Vectorizer>,
    scaler: Box<dyn Scaler>,
    classifier: Box<dyn Classifier>,
}

impl Artifacts {
    pub fn new(
        vectorizer: Box<dyn Vectorizer>,
        scaler: Box<dyn Scaler>,
        classifier: Box<dyn Classifier>,
    ) -> Self {
        Self {
            vectorizer,
            scaler,
            classifier,
        }
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn vectorizer(&self) -> &dyn Vectorizer {
        self.vectorizer.as_ref()
    }

    /// Runs the full chain on already cleaned text. Shape compatibility of the
    /// three artifacts is not checked here.
    pub fn predict(&self, cleaned: &str) -> InferenceResult<PredictedLabel> {
        let features = self.vectorizer.transform(cleaned)?;
        debug!("features: {} non-zero of {}", features.nnz(), features.dim());
        let scaled = self.scaler.transform(features)?;
        self.classifier
            .predict(&scaled)?
            .into_iter()
            .next()
            .ok_or(InferenceError::EmptyPrediction)
    }
}
