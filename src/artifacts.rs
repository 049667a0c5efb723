//! Loads the three pre-trained artifacts from disk into an [`Artifacts`]
//! context. Runs once at startup; any failure aborts the process.

use crate::classifier::LinearClassifier;
use crate::config::ArtifactPaths;
use crate::inference::{Artifacts, Classifier, PredictedLabel};
use crate::presentation::LabelPolicy;
use crate::scaler::MaxAbsScaler;
use crate::vectorizer::TfidfVectorizer;
use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::info;

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {} artifact {}", what, path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {} artifact {}", what, path.display()))
}

/// Every class must carry the label kind the policy dispatches on.
pub fn check_policy(classes: &[PredictedLabel], policy: LabelPolicy) -> Result<()> {
    let expected = policy.expected_label_kind();
    if let Some(class) = classes.iter().find(|c| c.kind() != expected) {
        bail!(
            "label policy {} expects {} labels but the classifier has class {:?}",
            policy,
            expected,
            class.to_string()
        );
    }
    Ok(())
}

pub fn load(paths: &ArtifactPaths, policy: LabelPolicy) -> Result<Artifacts> {
    let vectorizer: TfidfVectorizer = read_json(&paths.vectorizer, "vectorizer")?;
    vectorizer
        .validate()
        .with_context(|| format!("invalid vectorizer {}", paths.vectorizer.display()))?;

    let scaler: MaxAbsScaler = read_json(&paths.scaler, "scaler")?;
    scaler
        .validate()
        .with_context(|| format!("invalid scaler {}", paths.scaler.display()))?;

    let classifier: LinearClassifier = read_json(&paths.model, "classifier")?;
    classifier
        .validate()
        .with_context(|| format!("invalid classifier {}", paths.model.display()))?;

    let classes = classifier.classes();
    check_policy(&classes, policy)?;

    info!(
        "📦 Loaded artifacts: {} terms, {:?} scaler, {:?} classifier, {} {} classes [{}]",
        vectorizer.vocabulary_size(),
        scaler.kind(),
        classifier.kind(),
        classes.len(),
        classifier.label_kind(),
        classes.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    );

    Ok(Artifacts::new(
        Box::new(vectorizer),
        Box::new(scaler),
        Box::new(classifier),
    ))
}
