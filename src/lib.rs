//! # docmark
//!
//! Convert DOCX and PDF documents to Markdown.
//!
//! DOCX documents are parsed into styled runs and serialized structurally:
//! heading styles become `#` headings, bold and italic runs become `**`
//! and `*`. PDF pages are reduced to positioned text fragments, put back
//! into reading order, and heading-like lines are promoted to Markdown
//! headings. Named patterns can also pull key/value fields out of a PDF's
//! text.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> docmark::Result<()> {
//!     // Convert by file extension
//!     let markdown = docmark::to_markdown("report.docx")?;
//!     println!("{}", markdown);
//!
//!     // Pull fields out of a PDF
//!     let fields = docmark::extract_fields("invoice.pdf")?;
//!     println!("lote = {:?}", fields.get("lote"));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Style-aware DOCX conversion**: headings, bold, italic via a style map
//! - **Reading-order PDF text**: line grouping by baseline proximity
//! - **Heading heuristics**: all-caps and numbered-section lines
//! - **Field extraction**: validated, linear-time regex patterns
//! - **Parallel processing**: Uses Rayon for multi-page documents

pub mod convert;
pub mod detect;
pub mod error;
pub mod extract;
pub mod model;
pub mod parser;
pub mod render;
pub mod style;

// Re-export commonly used types
pub use convert::{
    convert, convert_named, ConvertMode, ConvertOptions, ConvertOutput, ConverterRegistry,
    DocumentConverter,
};
pub use detect::DocumentKind;
pub use error::{Error, Result};
pub use extract::{ExtractedFields, PatternRegistry, NOT_FOUND};
pub use parser::ParseOptions;
pub use render::{CleanupOptions, CleanupPreset, JsonFormat, RenderOptions, NO_CONTENT_SENTINEL};
pub use style::{MarkdownMarker, StyleMap};

use std::path::Path;

/// Convert in-memory document bytes, choosing the pipeline from the
/// original file name's extension.
///
/// # Example
///
/// ```no_run
/// let bytes = std::fs::read("report.docx").unwrap();
/// let output = docmark::convert_bytes(&bytes, "report.docx").unwrap();
/// println!("{}", output.to_markdown());
/// ```
pub fn convert_bytes(bytes: &[u8], file_name: &str) -> Result<ConvertOutput> {
    convert_named(bytes, file_name, &ConvertOptions::default())
}

/// Read and convert a file to Markdown.
pub fn convert_file<P: AsRef<Path>>(path: P) -> Result<ConvertOutput> {
    Docmark::new().convert_file(path)
}

/// Convert a DOCX or PDF file to Markdown text.
///
/// # Example
///
/// ```no_run
/// let markdown = docmark::to_markdown("document.pdf").unwrap();
/// println!("{}", markdown);
/// ```
pub fn to_markdown<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(convert_file(path)?.to_markdown())
}

/// Extract the built-in fields from a PDF file.
pub fn extract_fields<P: AsRef<Path>>(path: P) -> Result<ExtractedFields> {
    match Docmark::new().fields().convert_file(path)? {
        ConvertOutput::Fields(fields) => Ok(fields),
        ConvertOutput::Markdown(_) => Err(Error::UnsupportedFormat(
            "field extraction produced Markdown".to_string(),
        )),
    }
}

/// Convert on the blocking thread pool.
///
/// The conversion itself is not interruptible; dropping the returned
/// future discards its result once it completes.
#[cfg(feature = "async")]
pub async fn convert_async(
    bytes: Vec<u8>,
    file_name: String,
    options: ConvertOptions,
) -> Result<ConvertOutput> {
    tokio::task::spawn_blocking(move || convert_named(&bytes, &file_name, &options))
        .await
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
}

/// Builder for configuring and running conversions.
///
/// # Example
///
/// ```no_run
/// use docmark::{CleanupPreset, Docmark};
///
/// let markdown = Docmark::new()
///     .sequential()
///     .with_cleanup(CleanupPreset::Standard)
///     .convert_file("document.docx")?
///     .to_markdown();
/// # Ok::<(), docmark::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Docmark {
    options: ConvertOptions,
}

impl Docmark {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract fields instead of rendering Markdown (PDF only).
    pub fn fields(mut self) -> Self {
        self.options = self.options.fields();
        self
    }

    /// Disable parallel page reconstruction.
    pub fn sequential(mut self) -> Self {
        self.options.parse = self.options.parse.sequential();
        self
    }

    /// Use a custom DOCX style map.
    pub fn with_style_map(mut self, styles: StyleMap) -> Self {
        self.options.parse = self.options.parse.with_style_map(styles);
        self
    }

    /// Use a custom field pattern registry.
    pub fn with_patterns(mut self, patterns: PatternRegistry) -> Self {
        self.options = self.options.with_patterns(patterns);
        self
    }

    /// Set cleanup preset.
    pub fn with_cleanup(mut self, preset: CleanupPreset) -> Self {
        self.options.render = self.options.render.with_cleanup_preset(preset);
        self
    }

    /// Escape Markdown syntax characters in DOCX text.
    pub fn with_escape(mut self, escape: bool) -> Self {
        self.options.render = self.options.render.with_escape(escape);
        self
    }

    /// The options this builder has accumulated.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert in-memory bytes; the kind comes from `file_name`.
    pub fn convert_bytes(&self, bytes: &[u8], file_name: &str) -> Result<ConvertOutput> {
        convert_named(bytes, file_name, &self.options)
    }

    /// Read and convert a file.
    pub fn convert_file<P: AsRef<Path>>(&self, path: P) -> Result<ConvertOutput> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::UnsupportedFormat(format!("{}", path.display())))?;
        // reject unknown kinds before touching the file
        DocumentKind::from_file_name(file_name)?;
        let bytes = std::fs::read(path)?;
        self.convert_bytes(&bytes, file_name)
    }
}
