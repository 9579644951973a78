//! Input selection: an uploaded document always wins over pasted text.

use serde::Serialize;

use crate::extraction::{self, Document, DocumentFormat, ExtractionError};

/// Where the text handed to inference came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSource {
    Upload,
    Paste,
    /// No upload and only blank pasted text: nothing to classify.
    #[serde(rename = "none")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub source: TextSource,
    pub format: Option<DocumentFormat>,
}

impl ExtractedText {
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// True when `text` has nothing but whitespace. The ASCII information
/// separators (U+001C..U+001F) count as whitespace here.
pub fn is_blank(text: &str) -> bool {
    text.chars()
        .all(|c| c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c))
}

/// Picks the text to classify.
///
/// A present document is extracted regardless of `pasted_text`, even if the
/// extraction comes back empty. Pasted text is returned untrimmed; blankness
/// only decides whether it counts as present.
pub fn select(
    document: Option<&Document>,
    pasted_text: &str,
) -> Result<ExtractedText, ExtractionError> {
    if let Some(document) = document {
        return Ok(ExtractedText {
            text: extraction::extract(document)?,
            source: TextSource::Upload,
            format: Some(document.format),
        });
    }

    if !is_blank(pasted_text) {
        return Ok(ExtractedText {
            text: pasted_text.to_string(),
            source: TextSource::Paste,
            format: None,
        });
    }

    Ok(ExtractedText {
        text: String::new(),
        source: TextSource::Empty,
        format: None,
    })
}
