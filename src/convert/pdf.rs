//! PDF document converter implementation.

use crate::detect::{check_pdf_header, DocumentKind};
use crate::error::Result;
use crate::extract::extract_fields;
use crate::parser::{reconstruct_pages, LopdfBackend, PdfBackend, PdfPageExtractor};
use crate::render::{annotate, CleanupPipeline, NO_CONTENT_SENTINEL};

use super::{ConvertMode, ConvertOptions, ConvertOutput, DocumentConverter};

/// PDF document converter.
///
/// Reconstructs reading-order text from every page, then either promotes
/// heading-like lines to Markdown or runs the field patterns over it.
#[derive(Debug, Clone, Default)]
pub struct PdfConverter {
    _private: (),
}

impl PdfConverter {
    /// Create a new PDF converter.
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Convert from an already opened backend.
    pub fn convert_backend<B: PdfBackend + ?Sized>(
        &self,
        backend: &B,
        options: &ConvertOptions,
    ) -> Result<ConvertOutput> {
        let pages = PdfPageExtractor::new(backend).extract_all()?;
        let text = reconstruct_pages(&pages, options.parse.parallel);
        log::debug!("pdf: {} pages, {} chars", pages.len(), text.len());

        match options.mode {
            ConvertMode::Markdown => Ok(ConvertOutput::Markdown(self.render(&text, options))),
            ConvertMode::Fields => {
                // fields see the reconstructed text, before heading markers
                let name = options.source_name_or_default(DocumentKind::Pdf);
                Ok(ConvertOutput::Fields(extract_fields(
                    &text,
                    &name,
                    options.pattern_registry(),
                )))
            }
        }
    }

    fn render(&self, text: &str, options: &ConvertOptions) -> String {
        let mut markdown = annotate(text);
        if let Some(ref cleanup) = options.render.cleanup {
            markdown = CleanupPipeline::new(cleanup.clone()).process(&markdown);
        }
        if markdown.trim().is_empty() {
            NO_CONTENT_SENTINEL.to_string()
        } else {
            markdown
        }
    }
}

impl DocumentConverter for PdfConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn name(&self) -> &str {
        "pdf"
    }

    fn convert_bytes(&self, bytes: &[u8], options: &ConvertOptions) -> Result<ConvertOutput> {
        let version = check_pdf_header(bytes)?;
        log::debug!("pdf: version {}", version);
        let backend = LopdfBackend::load_bytes(bytes)?;
        self.convert_backend(&backend, options)
    }
}
