//! DOCX extraction: top-level body paragraphs joined with newlines.
//!
//! Only direct `w:p` children of `w:body` count as paragraphs; paragraphs
//! inside tables, text boxes and drawings are not part of the sequence.
//! Run text comes from `w:t`. `w:tab` and `w:ptab` map to a tab and
//! `w:noBreakHyphen` to `-`. `w:cr` and text-wrapping `w:br` map to a line
//! break; page and column breaks add nothing.

use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;
use zip::ZipArchive;

use super::{ExtractionError, TextExtractor};

const DOCUMENT_PART: &str = "word/document.xml";

/// Elements whose contents never contribute paragraph text.
const SKIPPED: &[&[u8]] = &[
    b"w:pPr",
    b"w:rPr",
    b"w:drawing",
    b"w:pict",
    b"w:object",
    b"mc:AlternateContent",
];

pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let xml = read_document_part(bytes)?;
        let paragraphs = parse_paragraphs(&xml)?;
        debug!(paragraphs = paragraphs.len(), "Extracted DOCX paragraphs");
        Ok(paragraphs.join("\n"))
    }
}

fn read_document_part(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::UnreadableDocx(e.to_string()))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractionError::UnreadableDocx(format!("{DOCUMENT_PART}: {e}")))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| ExtractionError::UnreadableDocx(format!("{DOCUMENT_PART}: {e}")))?;
    Ok(xml)
}

/// Parses `word/document.xml` into its body paragraphs, in document order.
pub fn parse_paragraphs(xml: &str) -> Result<Vec<String>, ExtractionError> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs = Vec::new();
    let mut in_body = false;
    let mut saw_body = false;
    // Open elements below w:body; a body paragraph sits at depth 1.
    let mut depth = 0usize;
    let mut current: Option<String> = None;
    let mut skip_until: Option<usize> = None;
    let mut in_text = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ExtractionError::UnreadableDocx(format!("malformed XML: {e}")))?;

        match event {
            Event::Start(e) => {
                let name = e.name();
                if !in_body {
                    if name.as_ref() == b"w:body" {
                        in_body = true;
                        saw_body = true;
                    }
                    continue;
                }
                depth += 1;
                match current {
                    None if depth == 1 && name.as_ref() == b"w:p" => {
                        current = Some(String::new());
                    }
                    Some(_) if skip_until.is_none() => {
                        if SKIPPED.iter().any(|skipped| *skipped == name.as_ref()) {
                            skip_until = Some(depth);
                        } else if name.as_ref() == b"w:t" {
                            in_text = true;
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                let name = e.name();
                if !in_body {
                    // an empty document still has a (self-closing) body
                    if name.as_ref() == b"w:body" {
                        saw_body = true;
                    }
                    continue;
                }
                if depth == 0 && name.as_ref() == b"w:p" {
                    paragraphs.push(String::new());
                } else if let (Some(text), None) = (current.as_mut(), skip_until) {
                    match name.as_ref() {
                        b"w:tab" | b"w:ptab" => text.push('\t'),
                        b"w:noBreakHyphen" => text.push('-'),
                        b"w:cr" => text.push('\n'),
                        b"w:br" if is_line_break(&e)? => text.push('\n'),
                        _ => {}
                    }
                }
            }
            Event::Text(t) => {
                if let (Some(text), None, true) = (current.as_mut(), skip_until, in_text) {
                    let unescaped = t.unescape().map_err(|e| {
                        ExtractionError::UnreadableDocx(format!("malformed XML text: {e}"))
                    })?;
                    text.push_str(&unescaped);
                }
            }
            Event::CData(c) => {
                if let (Some(text), None, true) = (current.as_mut(), skip_until, in_text) {
                    text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(e) => {
                if !in_body {
                    continue;
                }
                let name = e.name();
                if depth == 0 {
                    // closing w:body; nothing after it holds paragraphs
                    break;
                }
                if skip_until == Some(depth) {
                    skip_until = None;
                }
                if name.as_ref() == b"w:t" {
                    in_text = false;
                }
                if depth == 1 && name.as_ref() == b"w:p" {
                    if let Some(text) = current.take() {
                        paragraphs.push(text);
                    }
                }
                depth -= 1;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_body {
        return Err(ExtractionError::UnreadableDocx(
            "document has no w:body".to_string(),
        ));
    }
    Ok(paragraphs)
}

/// `w:br` without a type, or with `textWrapping`, is a line break.
fn is_line_break(br: &BytesStart<'_>) -> Result<bool, ExtractionError> {
    let break_type = br
        .try_get_attribute("w:type")
        .map_err(|e| ExtractionError::UnreadableDocx(format!("malformed w:br: {e}")))?;
    Ok(match break_type {
        None => true,
        Some(attr) => attr.value.as_ref() == b"textWrapping",
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

    pub(crate) fn document_xml(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W_NS}"><w:body>{body}<w:sectPr><w:pgSz w:w="12240" w:h="15840"/></w:sectPr></w:body></w:document>"#
        )
    }

    pub(crate) fn paragraph(text: &str) -> String {
        if text.is_empty() {
            "<w:p/>".to_string()
        } else {
            format!("<w:p><w:r><w:t xml:space=\"preserve\">{text}</w:t></w:r></w:p>")
        }
    }

    pub(crate) fn build_docx(body: &str) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("[Content_Types].xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<Types/>").unwrap();
        writer
            .start_file(DOCUMENT_PART, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(document_xml(body).as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_paragraphs_joined_in_order() {
        let body = [paragraph("Jane Doe"), paragraph("Data Scientist"), paragraph("Python, SQL")]
            .concat();
        let text = DocxExtractor.extract(&build_docx(&body)).unwrap();
        assert_eq!(text, "Jane Doe\nData Scientist\nPython, SQL");
    }

    #[test]
    fn test_segment_count_matches_paragraph_count_with_empties() {
        let body = [
            paragraph("Summary"),
            paragraph(""),
            "<w:p><w:pPr><w:pStyle w:val=\"Normal\"/></w:pPr></w:p>".to_string(),
            paragraph("Experience"),
        ]
        .concat();
        let text = DocxExtractor.extract(&build_docx(&body)).unwrap();
        assert_eq!(text.split('\n').count(), 4);
        assert_eq!(text, "Summary\n\n\nExperience");
    }

    #[test]
    fn test_runs_within_paragraph_concatenate() {
        let body = "<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>Machine</w:t></w:r>\
                    <w:r><w:t xml:space=\"preserve\"> Learning</w:t></w:r>\
                    <w:r><w:tab/><w:t>Engineer</w:t></w:r></w:p>";
        let paragraphs = parse_paragraphs(&document_xml(body)).unwrap();
        assert_eq!(paragraphs, vec!["Machine Learning\tEngineer".to_string()]);
    }

    #[test]
    fn test_paragraph_tab_stops_are_not_text() {
        let body = "<w:p><w:pPr><w:tabs><w:tab w:val=\"left\" w:pos=\"720\"/></w:tabs></w:pPr>\
                    <w:r><w:t>Skills</w:t></w:r></w:p>";
        let paragraphs = parse_paragraphs(&document_xml(body)).unwrap();
        assert_eq!(paragraphs, vec!["Skills".to_string()]);
    }

    #[test]
    fn test_table_paragraphs_are_not_body_paragraphs() {
        let body = format!(
            "{}<w:tbl><w:tr><w:tc>{}</w:tc></w:tr></w:tbl>{}",
            paragraph("Before"),
            paragraph("Cell"),
            paragraph("After")
        );
        let paragraphs = parse_paragraphs(&document_xml(&body)).unwrap();
        assert_eq!(paragraphs, vec!["Before".to_string(), "After".to_string()]);
    }

    #[test]
    fn test_entities_are_unescaped() {
        let paragraphs = parse_paragraphs(&document_xml(&paragraph("R&amp;D &lt;lead&gt;"))).unwrap();
        assert_eq!(paragraphs, vec!["R&D <lead>".to_string()]);
    }

    #[test]
    fn test_page_break_is_not_a_segment() {
        let body = "<w:p><w:r><w:t>Summary</w:t><w:br w:type=\"page\"/></w:r></w:p>\
                    <w:p><w:r><w:br w:type=\"column\"/><w:t>Experience</w:t></w:r></w:p>";
        let text = DocxExtractor.extract(&build_docx(body)).unwrap();
        assert_eq!(text, "Summary\nExperience");
        assert_eq!(text.split('\n').count(), 2);
    }

    #[test]
    fn test_text_wrapping_breaks_are_newlines() {
        let body = "<w:p><w:r><w:t>Jane Doe</w:t><w:br/><w:t>London</w:t>\
                    <w:br w:type=\"textWrapping\"/><w:t>UK</w:t><w:cr/><w:t>2024</w:t></w:r></w:p>";
        let paragraphs = parse_paragraphs(&document_xml(body)).unwrap();
        assert_eq!(paragraphs, vec!["Jane Doe\nLondon\nUK\n2024".to_string()]);
    }

    #[test]
    fn test_hyphen_and_positional_tab_are_kept() {
        let body = "<w:p><w:r><w:t>co</w:t><w:noBreakHyphen/><w:t>founder</w:t>\
                    <w:ptab w:relativeTo=\"margin\" w:alignment=\"right\" w:leader=\"none\"/>\
                    <w:t>2019</w:t></w:r></w:p>";
        let paragraphs = parse_paragraphs(&document_xml(body)).unwrap();
        assert_eq!(paragraphs, vec!["co-founder\t2019".to_string()]);
    }

    #[test]
    fn test_self_closing_body_is_empty_document() {
        let xml = format!("<w:document xmlns:w=\"{W_NS}\"><w:body/></w:document>");
        assert!(parse_paragraphs(&xml).unwrap().is_empty());

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(DOCUMENT_PART, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        assert_eq!(DocxExtractor.extract(&bytes).unwrap(), "");
    }

    #[test]
    fn test_missing_body_is_unreadable() {
        let xml = format!("<w:document xmlns:w=\"{W_NS}\"></w:document>");
        let err = parse_paragraphs(&xml).unwrap_err();
        assert!(matches!(err, ExtractionError::UnreadableDocx(_)));
    }

    #[test]
    fn test_not_a_zip_is_unreadable() {
        let err = DocxExtractor.extract(b"PK but not really").unwrap_err();
        assert!(matches!(err, ExtractionError::UnreadableDocx(_)));
    }

    #[test]
    fn test_zip_without_document_part_is_unreadable() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/styles.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<w:styles/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let err = DocxExtractor.extract(&bytes).unwrap_err();
        assert!(matches!(err, ExtractionError::UnreadableDocx(msg) if msg.contains(DOCUMENT_PART)));
    }

    #[test]
    fn test_malformed_xml_is_unreadable() {
        let xml = "<w:document><w:body><w:p><w:r><w:t>oops</w:r></w:p></w:body></w:document>";
        let err = parse_paragraphs(xml).unwrap_err();
        assert!(matches!(err, ExtractionError::UnreadableDocx(_)));
    }
}
