//! Axum route handlers for the Classification API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classification::{classify, select, TextSource};
use crate::errors::AppError;
use crate::extraction::{Document, DocumentFormat};
use crate::model::{Artifacts, Label};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ClassifyTextRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    /// `None` when there was nothing to classify.
    pub label: Option<Label>,
    pub source: TextSource,
    pub format: Option<DocumentFormat>,
}

#[derive(Debug, Serialize)]
pub struct ModelInfoResponse {
    pub classes: Vec<Label>,
    pub vocabulary_size: usize,
    pub n_features: usize,
}

/// Raw form fields, before the upload's format has been validated.
#[derive(Debug, Default)]
struct Submission {
    upload: Option<(String, Bytes)>,
    text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/classify
///
/// Multipart form with an optional `file` part (PDF or DOCX) and an optional
/// `text` part. The file wins when both are present.
pub async fn handle_classify(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ClassifyResponse>, AppError> {
    let submission = read_submission(multipart).await?;

    // Reject unsupported extensions here, before any extraction work is queued.
    let document = submission
        .upload
        .map(|(file_name, bytes)| Document::from_upload(&file_name, bytes))
        .transpose()?;

    run_classification(state, document, submission.text).await
}

/// POST /api/v1/classify/text
pub async fn handle_classify_text(
    State(state): State<AppState>,
    Json(request): Json<ClassifyTextRequest>,
) -> Result<Json<ClassifyResponse>, AppError> {
    run_classification(state, None, request.text).await
}

/// GET /api/v1/model
pub async fn handle_model_info(
    State(state): State<AppState>,
) -> Result<Json<ModelInfoResponse>, AppError> {
    let artifacts = state.artifacts.get_or_load()?;
    Ok(Json(ModelInfoResponse {
        classes: artifacts.classifier.classes().to_vec(),
        vocabulary_size: artifacts.vectorizer.vocabulary_size(),
        n_features: artifacts.classifier.n_features(),
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

async fn read_submission(mut multipart: Multipart) -> Result<Submission, AppError> {
    let mut submission = Submission::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                // Browsers send an empty, unnamed part when no file was chosen.
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                if file_name.is_empty() {
                    return Err(AppError::Validation(
                        "file part is missing a file name".to_string(),
                    ));
                }
                submission.upload = Some((file_name, bytes));
            }
            "text" => submission.text = field.text().await?,
            other => debug!("Ignoring unknown form field {other:?}"),
        }
    }

    Ok(submission)
}

async fn run_classification(
    state: AppState,
    document: Option<Document>,
    pasted_text: String,
) -> Result<Json<ClassifyResponse>, AppError> {
    let store = state.artifacts.clone();
    let response = tokio::task::spawn_blocking(move || -> Result<ClassifyResponse, AppError> {
        let artifacts = store.get_or_load()?;
        classify_submission(&artifacts, document.as_ref(), &pasted_text)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("classification task failed: {e}")))??;

    Ok(Json(response))
}

/// Synchronous select → classify for one request.
fn classify_submission(
    artifacts: &Artifacts,
    document: Option<&Document>,
    pasted_text: &str,
) -> Result<ClassifyResponse, AppError> {
    let selected = select(document, pasted_text)?;
    let label = classify(artifacts, selected.as_str())?;

    match &label {
        Some(label) => info!(
            source = ?selected.source,
            chars = selected.text.len(),
            "Predicted role: {label}"
        ),
        None => info!(source = ?selected.source, "Nothing to classify"),
    }

    Ok(ClassifyResponse {
        label,
        source: selected.source,
        format: selected.format,
    })
}
