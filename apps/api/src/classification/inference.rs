use tracing::debug;

use crate::classification::is_blank;
use crate::model::{Artifacts, InferenceError, Label};

/// Classifies `text` with the loaded artifacts.
///
/// Returns `Ok(None)` for blank input without touching the model.
pub fn classify(artifacts: &Artifacts, text: &str) -> Result<Option<Label>, InferenceError> {
    if is_blank(text) {
        return Ok(None);
    }

    let features = artifacts.vectorizer.transform(text);
    debug!(
        nonzero = features.entries.len(),
        dim = features.dim,
        "Vectorized input text"
    );
    if features.is_zero() {
        debug!("No in-vocabulary terms; intercepts alone decide the label");
    }
    let label = artifacts.classifier.predict(&features)?;
    Ok(Some(label))
}
