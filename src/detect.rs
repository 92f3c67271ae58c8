//! Document kind detection and header validation.
//!
//! Dispatch is decided by the declared kind, which callers derive from the
//! original file name. The header checks below never pick a pipeline; they
//! only reject bytes that cannot belong to the declared kind.

use crate::error::{Error, Result};
use std::path::Path;

/// Kind of document declared by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Word-processing document (Office Open XML, `.docx`)
    Docx,
    /// Page-based PDF document
    Pdf,
}

impl DocumentKind {
    /// Lowercase file extension for this kind, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::Docx => "docx",
            DocumentKind::Pdf => "pdf",
        }
    }

    /// Resolve a kind from a bare extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "docx" => Ok(DocumentKind::Docx),
            "pdf" => Ok(DocumentKind::Pdf),
            other => Err(Error::UnsupportedFormat(format!(
                "'.{}' (only .docx and .pdf are supported)",
                other
            ))),
        }
    }

    /// Resolve a kind from an original file name such as `report.PDF`.
    ///
    /// # Example
    /// ```
    /// use docmark::DocumentKind;
    ///
    /// assert_eq!(DocumentKind::from_file_name("notes.docx").unwrap(), DocumentKind::Docx);
    /// assert!(DocumentKind::from_file_name("notes.txt").is_err());
    /// ```
    pub fn from_file_name(name: &str) -> Result<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                Error::UnsupportedFormat(format!("'{}' has no file extension", name))
            })?;
        Self::from_extension(ext)
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::Docx => write!(f, "DOCX"),
            DocumentKind::Pdf => write!(f, "PDF"),
        }
    }
}

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_MAGIC_LEN: usize = 5;
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Local file header signature that starts every zip container.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Check that `data` starts with a PDF header and return its version.
pub fn check_pdf_header(data: &[u8]) -> Result<String> {
    if data.len() < PDF_MAGIC_LEN + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::corrupt("missing %PDF- header"));
    }

    let version_bytes = &data[PDF_MAGIC_LEN..PDF_MAGIC_LEN + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_valid_version(&version) {
        return Err(Error::corrupt(format!("malformed PDF version '{}'", version)));
    }

    Ok(version)
}

/// Check that `data` starts with a zip local file header.
pub fn check_zip_header(data: &[u8]) -> Result<()> {
    if data.starts_with(ZIP_MAGIC) {
        Ok(())
    } else {
        Err(Error::corrupt("not a zip container"))
    }
}

/// Check if a version string is valid.
fn is_valid_version(version: &str) -> bool {
    if version.len() != 3 {
        return false;
    }

    let chars: Vec<char> = version.chars().collect();
    chars[0].is_ascii_digit() && chars[1] == '.' && chars[2].is_ascii_digit()
}
