//! TF-IDF vectorizer backed by a fitted vocabulary and IDF weights.

use crate::inference::{InferenceResult, SparseVector, Vectorizer};
use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Words of two or more word characters.
static TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid token pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

fn default_true() -> bool {
    true
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

/// Fitted TF-IDF transform, deserialized from the vectorizer artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// term -> feature column
    vocabulary: HashMap<String, usize>,
    /// IDF weight per column
    idf: Vec<f64>,
    #[serde(default = "default_norm")]
    norm: Option<Norm>,
    /// Use 1 + ln(tf) instead of raw counts
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default = "default_true")]
    lowercase: bool,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default)]
    stop_words: HashSet<String>,
}

impl TfidfVectorizer {
    /// Checks the internal consistency of a freshly loaded artifact.
    pub fn validate(&self) -> Result<()> {
        if self.idf.len() != self.vocabulary.len() {
            bail!(
                "idf has {} weights but vocabulary has {} terms",
                self.idf.len(),
                self.vocabulary.len()
            );
        }
        if let Some((term, col)) = self.vocabulary.iter().find(|(_, col)| **col >= self.idf.len()) {
            bail!("term {:?} maps to column {} outside 0..{}", term, col, self.idf.len());
        }
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            bail!("invalid ngram_range ({}, {})", min_n, max_n);
        }
        Ok(())
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered;
        let source = if self.lowercase {
            lowered = text.to_lowercase();
            lowered.as_str()
        } else {
            text
        };
        TOKEN_REGEX
            .find_iter(source)
            .map(|m| m.as_str().to_string())
            .filter(|t| !self.stop_words.contains(t))
            .collect()
    }

    /// Word n-grams, shortest first, joined with single spaces.
    fn ngrams(&self, tokens: &[String]) -> Vec<String> {
        let (min_n, max_n) = self.ngram_range;
        if (min_n, max_n) == (1, 1) {
            return tokens.to_vec();
        }
        let mut grams = Vec::new();
        for n in min_n..=max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                grams.push(window.join(" "));
            }
        }
        grams
    }
}

impl Vectorizer for TfidfVectorizer {
    fn transform(&self, text: &str) -> InferenceResult<SparseVector> {
        let tokens = self.tokenize(text);
        if tokens.is_empty() {
            return Ok(SparseVector::zeros(self.idf.len()));
        }
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for gram in self.ngrams(&tokens) {
            if let Some(&col) = self.vocabulary.get(&gram) {
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
        }

        let weighted: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(col, tf)| {
                let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                (col, tf * self.idf[col])
            })
            .collect();

        let vector = SparseVector::from_entries(self.idf.len(), weighted)?;
        let norm = match self.norm {
            Some(Norm::L2) => vector.entries().iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
            Some(Norm::L1) => vector.entries().iter().map(|(_, v)| v.abs()).sum::<f64>(),
            None => return Ok(vector),
        };
        if norm == 0.0 {
            return Ok(vector);
        }
        Ok(vector.map_values(|_, v| v / norm))
    }

    fn dim(&self) -> usize {
        self.idf.len()
    }
}
