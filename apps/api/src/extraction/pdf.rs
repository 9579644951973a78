//! PDF extraction: one text block per page, joined in page order.

use lopdf::Document as PdfDocument;
use tracing::debug;

use super::{ExtractionError, TextExtractor};

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let pages = extract_pages(bytes)?;
        Ok(join_pages(&pages))
    }
}

/// Returns the text of every page in page order.
///
/// Pages with no text layer, or whose content cannot be decoded, yield an
/// empty string. Only a document that cannot be opened at all is an error.
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
    let doc = PdfDocument::load_mem(bytes)
        .map_err(|e| ExtractionError::UnreadablePdf(e.to_string()))?;

    // get_pages is a BTreeMap keyed by 1-based page number
    let pages: Vec<String> = doc
        .get_pages()
        .into_keys()
        .map(|page_number| match doc.extract_text(&[page_number]) {
            Ok(text) if !text.trim().is_empty() => text.trim_end_matches('\n').to_string(),
            Ok(_) => {
                debug!(page = page_number, "PDF page has no extractable text");
                String::new()
            }
            Err(e) => {
                debug!(page = page_number, "Skipping PDF page: {e}");
                String::new()
            }
        })
        .collect();

    debug!(pages = pages.len(), "Extracted PDF pages");
    Ok(pages)
}

fn join_pages(pages: &[String]) -> String {
    pages.join("\n")
}
