//! Column scaling applied between the vectorizer and the classifier.

use crate::inference::{InferenceError, InferenceResult, Scaler, SparseVector};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScalerKind {
    /// Divide by the per-column maximum absolute value seen in training
    #[default]
    MaxAbs,
    /// Divide by the per-column standard deviation, no centering
    Standard,
}

/// Fitted scaling transform. Both kinds reduce to a per-column division,
/// which keeps sparse input sparse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaxAbsScaler {
    #[serde(default)]
    kind: ScalerKind,
    scale: Vec<f64>,
}

impl MaxAbsScaler {
    pub fn validate(&self) -> Result<()> {
        if let Some((col, s)) = self
            .scale
            .iter()
            .enumerate()
            .find(|(_, s)| !s.is_finite() || **s < 0.0)
        {
            bail!("scale[{}] = {} is not a finite non-negative number", col, s);
        }
        Ok(())
    }

    pub fn kind(&self) -> ScalerKind {
        self.kind
    }
}

impl Scaler for MaxAbsScaler {
    fn transform(&self, features: SparseVector) -> InferenceResult<SparseVector> {
        if features.dim() != self.scale.len() {
            return Err(InferenceError::DimensionMismatch {
                stage: "scaler",
                expected: self.scale.len(),
                actual: features.dim(),
            });
        }
        Ok(features.map_values(|col, v| {
            let s = self.scale[col];
            if s == 0.0 {
                v
            } else {
                v / s
            }
        }))
    }
}
