//! Upload text extraction
//!
//! Turns an uploaded file into a [`Document`]. PDFs go through
//! `pdf-extract`; every other file is read as UTF-8, replacing invalid
//! sequences rather than rejecting the upload.

use pdf_extract::extract_text_from_mem;
use shared_types::Document;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    #[error("PDF is password protected")]
    PasswordProtected,

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Uploaded file '{0}' contains no text")]
    Empty(String),
}

/// Whether `filename` has a `.pdf` extension (any case)
pub fn is_pdf(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("pdf"))
}

pub fn extract_document(filename: &str, bytes: &[u8]) -> Result<Document, ExtractionError> {
    if bytes.is_empty() {
        return Err(ExtractionError::Empty(filename.to_string()));
    }

    let content = if is_pdf(filename) {
        let text = extract_pdf_text(bytes)?;
        if text.trim().is_empty() {
            // Scanned or image-only PDF
            return Err(ExtractionError::Empty(filename.to_string()));
        }
        text
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    };

    debug!("Extracted {} chars from {}", content.chars().count(), filename);

    Ok(Document::new(filename, content))
}

fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    extract_text_from_mem(bytes).map_err(|e| {
        let message = e.to_string();
        let lower = message.to_lowercase();

        if lower.contains("encrypted") || lower.contains("password") {
            ExtractionError::PasswordProtected
        } else if lower.contains("invalid")
            || lower.contains("malformed")
            || lower.contains("corrupt")
            || lower.contains("parse")
        {
            ExtractionError::InvalidPdf(message)
        } else {
            ExtractionError::Extraction(message)
        }
    })
}
