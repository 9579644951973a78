//! Text extraction from uploaded documents.
//!
//! The upload's file name is resolved to a `DocumentFormat` once, when the
//! `Document` is built. Unsupported extensions never reach an extractor.

pub mod docx;
pub mod pdf;

use std::fmt;
use std::path::Path;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

pub use docx::DocxExtractor;
pub use pdf::PdfExtractor;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unreadable PDF: {0}")]
    UnreadablePdf(String),

    #[error("Unreadable DOCX: {0}")]
    UnreadableDocx(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),
}

/// Common capability for every per-format extraction strategy.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// Upload formats accepted by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Matches a bare extension (no leading dot), case-insensitively.
    pub fn from_extension(extension: &str) -> Result<Self, ExtractionError> {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            other => Err(ExtractionError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn from_file_name(file_name: &str) -> Result<Self, ExtractionError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| ExtractionError::UnsupportedFormat(file_name.to_string()))?;
        Self::from_extension(extension)
    }

    pub fn extractor(self) -> &'static dyn TextExtractor {
        match self {
            DocumentFormat::Pdf => &PdfExtractor,
            DocumentFormat::Docx => &DocxExtractor,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Pdf => f.write_str("pdf"),
            DocumentFormat::Docx => f.write_str("docx"),
        }
    }
}

/// An uploaded file whose format has already been validated.
#[derive(Debug, Clone)]
pub struct Document {
    pub format: DocumentFormat,
    pub bytes: Bytes,
}

impl Document {
    pub fn new(format: DocumentFormat, bytes: impl Into<Bytes>) -> Self {
        Self {
            format,
            bytes: bytes.into(),
        }
    }

    /// Builds a document from an upload, rejecting unsupported extensions.
    pub fn from_upload(file_name: &str, bytes: impl Into<Bytes>) -> Result<Self, ExtractionError> {
        let format = DocumentFormat::from_file_name(file_name)?;
        Ok(Self::new(format, bytes))
    }
}

/// Extracts all text from `document` as a single string.
pub fn extract(document: &Document) -> Result<String, ExtractionError> {
    let text = document.format.extractor().extract(&document.bytes)?;
    tracing::debug!(
        format = %document.format,
        bytes = document.bytes.len(),
        chars = text.len(),
        "Extracted document text"
    );
    Ok(text)
}
