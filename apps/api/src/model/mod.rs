// Pre-trained model artifacts: a fitted TF-IDF vectorizer and a fitted linear
// classifier. Both are read-only once loaded; nothing here ever refits.

pub mod artifacts;
pub mod linear;
pub mod vectorizer;

use std::fmt;

use serde::Serialize;
use thiserror::Error;

pub use artifacts::{ArtifactLoadError, ArtifactPaths, ArtifactStore, Artifacts};
pub use linear::LinearClassifier;
pub use vectorizer::{FeatureVector, TfidfVectorizer};

/// Artifact format version this build understands.
pub const ARTIFACT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error(
        "feature width mismatch: vectorizer produces {vectorizer} columns, classifier expects {classifier}"
    )]
    DimensionMismatch { vectorizer: usize, classifier: usize },
}

/// One of the classifier's fitted output categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
