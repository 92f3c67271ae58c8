//! Error types for docmark library.

use std::io;
use thiserror::Error;

/// Result type alias for docmark operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during document conversion.
#[derive(Error, Debug)]
pub enum Error {
    /// The declared document kind is not recognized, or the requested
    /// conversion mode does not apply to it.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The document's internal structure cannot be parsed.
    ///
    /// Covers malformed zip containers, malformed XML parts and
    /// undecodable PDF objects or page content streams.
    #[error("Corrupt input: {0}")]
    CorruptInput(String),

    /// An extraction pattern was rejected while building a registry.
    #[error("Invalid extraction pattern '{name}': {reason}")]
    InvalidPattern {
        /// Field name the pattern was registered under
        name: String,
        /// Why the pattern was rejected
        reason: String,
    },

    /// I/O error when reading input files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Shorthand for a [`Error::CorruptInput`] with a formatted message.
    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        Error::CorruptInput(msg.into())
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::CorruptInput(format!("PDF: {}", err)),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::CorruptInput(format!("zip: {}", e)),
            _ => Error::CorruptInput(format!("zip: {}", err)),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::CorruptInput(format!("XML: {}", err))
    }
}
