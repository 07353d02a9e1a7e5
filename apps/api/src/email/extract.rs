//! Text extraction for uploaded files. Dispatch is by filename extension only.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("text file is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),
}

/// File kinds accepted by `POST /upload-file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Pdf,
}

impl FileKind {
    /// Case-insensitive match on `.txt` / `.pdf`.
    pub fn from_filename(filename: &str) -> Result<Self, ExtractError> {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".txt") {
            Ok(FileKind::Text)
        } else if lower.ends_with(".pdf") {
            Ok(FileKind::Pdf)
        } else {
            Err(ExtractError::UnsupportedFileType(filename.to_string()))
        }
    }
}

/// Extracts the email text from an uploaded file.
///
/// `.txt` is decoded as UTF-8; `.pdf` is extracted page by page and the pages
/// are joined with newlines. Blocking — PDF parsing is CPU-bound.
pub fn extract_text(filename: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    match FileKind::from_filename(filename)? {
        FileKind::Text => Ok(String::from_utf8(bytes.to_vec())?),
        FileKind::Pdf => extract_pdf_text(bytes),
    }
}

fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;
    Ok(pages.join("\n"))
}
