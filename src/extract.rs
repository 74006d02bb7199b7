//! Uploaded-document text extraction. A pure classification on the declared
//! file extension picks one of a closed set of transforms from bytes to text.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Plain,
    Word,
    Pdf,
    /// Unrecognized extension; decoded as plain text.
    Fallback,
}

pub fn classify(filename: &str) -> DocumentKind {
    let lower = filename.to_lowercase();
    if lower.ends_with(".txt") {
        DocumentKind::Plain
    } else if lower.ends_with(".docx") {
        DocumentKind::Word
    } else if lower.ends_with(".pdf") {
        DocumentKind::Pdf
    } else {
        DocumentKind::Fallback
    }
}

/// Extracts plain text from an uploaded blob. Fails only when the container
/// itself cannot be opened; paragraphs or pages without text contribute empty
/// segments.
pub fn extract_text(filename: &str, data: &[u8]) -> Result<String, AppError> {
    match classify(filename) {
        DocumentKind::Plain | DocumentKind::Fallback => Ok(decode_utf8_ignoring(data)),
        DocumentKind::Word => extract_docx(data),
        DocumentKind::Pdf => extract_pdf(data),
    }
}

/// UTF-8 decode that drops undecodable bytes instead of failing.
fn decode_utf8_ignoring(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len());
    let mut rest = data;
    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                out.push_str(valid);
                break;
            }
            Err(err) => {
                let valid_up_to = err.valid_up_to();
                if let Ok(valid) = std::str::from_utf8(&rest[..valid_up_to]) {
                    out.push_str(valid);
                }
                let skip = err.error_len().unwrap_or(rest.len() - valid_up_to);
                rest = &rest[valid_up_to + skip..];
                if rest.is_empty() {
                    break;
                }
            }
        }
    }
    out
}

/// Paragraph texts from `word/document.xml`, joined with newlines. A docx is
/// a zip container; a blob the zip reader cannot open is an extraction error.
fn extract_docx(data: &[u8]) -> Result<String, AppError> {
    let mut archive = ZipArchive::new(Cursor::new(data))
        .map_err(|e| AppError::Extraction(format!("Cannot open docx container: {}", e)))?;

    let mut document_xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| AppError::Extraction(format!("Missing document body: {}", e)))?
        .read_to_string(&mut document_xml)
        .map_err(|e| AppError::Extraction(format!("Unreadable document body: {}", e)))?;

    let mut reader = Reader::from_str(&document_xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                if start.local_name().as_ref() == b"t" {
                    in_text_run = true;
                }
            }
            Ok(Event::End(end)) => match end.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Text(text)) if in_text_run => {
                let unescaped = text
                    .unescape()
                    .map_err(|e| AppError::Extraction(format!("Malformed docx XML: {}", e)))?;
                current.push_str(&unescaped);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(AppError::Extraction(format!("Malformed docx XML: {}", e)))
            }
            _ => {}
        }
    }

    Ok(paragraphs.join("\n"))
}

/// Per-page text joined with newlines. Pages that yield no extractable text
/// contribute an empty segment rather than failing the whole document.
fn extract_pdf(data: &[u8]) -> Result<String, AppError> {
    let document = lopdf::Document::load_mem(data)
        .map_err(|e| AppError::Extraction(format!("Cannot open PDF: {}", e)))?;

    let pages: Vec<String> = document
        .get_pages()
        .keys()
        .map(|page| document.extract_text(&[*page]).unwrap_or_default())
        .collect();

    Ok(pages.join("\n"))
}
