//! Linear decision-function classifier.
//!
//! Covers logistic regression, linear SVMs and naive Bayes exported in log
//! space: every one of them predicts `argmax(coef · x + intercept)`.

use crate::inference::{Classifier, InferenceError, InferenceResult, LabelKind, PredictedLabel, SparseVector};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Model family named by the artifact's `kind`. Unknown kinds fail to
/// deserialize, so `load` rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    #[default]
    Linear,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearClassifier {
    #[serde(default)]
    kind: ClassifierKind,
    classes: Vec<PredictedLabel>,
    /// One row per class, or a single row for a binary problem
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
}

impl LinearClassifier {
    pub fn validate(&self) -> Result<()> {
        if self.classes.len() < 2 {
            bail!("classifier needs at least two classes, got {}", self.classes.len());
        }
        let kinds: Vec<LabelKind> = self.classes.iter().map(PredictedLabel::kind).collect();
        if kinds.iter().any(|k| *k != kinds[0]) {
            bail!("classes mix integer and text labels");
        }
        let binary = self.coef.len() == 1 && self.classes.len() == 2;
        if !binary && self.coef.len() != self.classes.len() {
            bail!(
                "coef has {} rows for {} classes",
                self.coef.len(),
                self.classes.len()
            );
        }
        if self.intercept.len() != self.coef.len() {
            bail!(
                "intercept has {} entries for {} coef rows",
                self.intercept.len(),
                self.coef.len()
            );
        }
        let width = self.coef[0].len();
        if self.coef.iter().any(|row| row.len() != width) {
            bail!("coef rows have different widths");
        }
        Ok(())
    }

    pub fn kind(&self) -> ClassifierKind {
        self.kind
    }

    /// Label kind shared by every class. Only meaningful after `validate`.
    pub fn label_kind(&self) -> LabelKind {
        self.classes
            .first()
            .map(PredictedLabel::kind)
            .unwrap_or(LabelKind::Text)
    }

    pub fn n_features(&self) -> usize {
        self.coef.first().map(Vec::len).unwrap_or(0)
    }

    fn decision_function(&self, features: &SparseVector) -> InferenceResult<Vec<f64>> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| features.dot(row).map(|score| score + b))
            .collect()
    }
}

impl Classifier for LinearClassifier {
    fn predict(&self, features: &SparseVector) -> InferenceResult<Vec<PredictedLabel>> {
        if features.dim() != self.n_features() {
            return Err(InferenceError::DimensionMismatch {
                stage: "classifier",
                expected: self.n_features(),
                actual: features.dim(),
            });
        }
        let scores = self.decision_function(features)?;
        let winner = if scores.len() == 1 {
            usize::from(scores[0] > 0.0)
        } else {
            // first maximum wins ties
            scores
                .iter()
                .enumerate()
                .fold(0, |best, (i, s)| if *s > scores[best] { i } else { best })
        };
        let label = self
            .classes
            .get(winner)
            .cloned()
            .ok_or_else(|| InferenceError::Artifact(format!("no class at index {}", winner)))?;
        Ok(vec![label])
    }

    fn classes(&self) -> Vec<PredictedLabel> {
        self.classes.clone()
    }
}
