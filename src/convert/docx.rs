//! DOCX document converter implementation.

use crate::error::{Error, Result};
use crate::parser::DocxParser;
use crate::render::to_markdown;

use super::{ConvertMode, ConvertOptions, ConvertOutput, DocumentConverter};

/// DOCX document converter.
///
/// Parses the document body into styled runs and serializes them to
/// Markdown.
#[derive(Debug, Clone, Default)]
pub struct DocxConverter {
    _private: (),
}

impl DocxConverter {
    /// Create a new DOCX converter.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl DocumentConverter for DocxConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["docx"]
    }

    fn name(&self) -> &str {
        "docx"
    }

    fn convert_bytes(&self, bytes: &[u8], options: &ConvertOptions) -> Result<ConvertOutput> {
        if options.mode == ConvertMode::Fields {
            return Err(Error::UnsupportedFormat(
                "field extraction is only available for PDF documents".to_string(),
            ));
        }

        let doc = DocxParser::from_bytes_with_styles(bytes, options.parse.styles())?.parse()?;
        log::debug!("docx: {} blocks", doc.blocks.len());
        Ok(ConvertOutput::Markdown(to_markdown(&doc, &options.render)))
    }
}
