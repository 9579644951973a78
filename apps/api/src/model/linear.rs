use serde::Deserialize;

use super::vectorizer::FeatureVector;
use super::{InferenceError, Label};

/// On-disk form of the fitted linear classifier.
#[derive(Debug, Deserialize)]
pub struct ClassifierArtifact {
    pub version: u32,
    pub classes: Vec<String>,
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
}

/// One-vs-rest linear model (e.g. a linear SVM).
///
/// A binary model stores a single weight row: a positive score selects
/// `classes[1]`, anything else `classes[0]`. Otherwise there is one row per
/// class and the highest score wins, the earliest class on ties.
#[derive(Debug)]
pub struct LinearClassifier {
    classes: Vec<Label>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
}

impl TryFrom<ClassifierArtifact> for LinearClassifier {
    type Error = String;

    fn try_from(artifact: ClassifierArtifact) -> Result<Self, Self::Error> {
        let n_classes = artifact.classes.len();
        if n_classes < 2 {
            return Err(format!("expected at least 2 classes, found {n_classes}"));
        }

        let rows = artifact.coef.len();
        let expected_rows = if n_classes == 2 { 1 } else { n_classes };
        if rows != expected_rows && rows != n_classes {
            return Err(format!(
                "{n_classes} classes need {expected_rows} coefficient rows, found {rows}"
            ));
        }
        if artifact.intercept.len() != rows {
            return Err(format!(
                "{rows} coefficient rows but {} intercepts",
                artifact.intercept.len()
            ));
        }

        let width = artifact.coef[0].len();
        if let Some(i) = artifact.coef.iter().position(|row| row.len() != width) {
            return Err(format!(
                "coefficient row {i} has {} columns, expected {width}",
                artifact.coef[i].len()
            ));
        }

        Ok(Self {
            classes: artifact.classes.into_iter().map(Label::new).collect(),
            coef: artifact.coef,
            intercept: artifact.intercept,
        })
    }
}

impl LinearClassifier {
    pub fn classes(&self) -> &[Label] {
        &self.classes
    }

    /// Number of input features each weight row expects.
    pub fn n_features(&self) -> usize {
        self.coef[0].len()
    }

    /// One score per weight row.
    pub fn decision_function(&self, x: &FeatureVector) -> Result<Vec<f64>, InferenceError> {
        if x.dim != self.n_features() {
            return Err(InferenceError::DimensionMismatch {
                vectorizer: x.dim,
                classifier: self.n_features(),
            });
        }
        Ok(self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, bias)| x.dot(row) + bias)
            .collect())
    }

    pub fn predict(&self, x: &FeatureVector) -> Result<Label, InferenceError> {
        let scores = self.decision_function(x)?;

        let index = if scores.len() == 1 {
            usize::from(scores[0] > 0.0)
        } else {
            let mut best = 0;
            for (i, score) in scores.iter().enumerate().skip(1) {
                if *score > scores[best] {
                    best = i;
                }
            }
            best
        };

        Ok(self.classes[index].clone())
    }
}
