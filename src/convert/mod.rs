//! Document conversion: dispatch by document kind and converter registry.
//!
//! [`convert`] is the core entry point: raw bytes and a declared
//! [`DocumentKind`] in, Markdown (or extracted fields) out. The
//! [`ConverterRegistry`] offers the same dispatch keyed on file extensions.
//!
//! # Example
//!
//! ```no_run
//! use docmark::convert::{ConverterRegistry, ConvertOptions};
//! use std::path::Path;
//!
//! fn main() -> docmark::Result<()> {
//!     let registry = ConverterRegistry::with_defaults();
//!     let output = registry.convert(Path::new("report.docx"), &ConvertOptions::default())?;
//!     println!("{}", output.to_markdown());
//!     Ok(())
//! }
//! ```

mod docx;
mod pdf;

pub use docx::DocxConverter;
pub use pdf::PdfConverter;

use crate::detect::DocumentKind;
use crate::error::{Error, Result};
use crate::extract::{ExtractedFields, PatternRegistry};
use crate::parser::ParseOptions;
use crate::render::{fields_to_markdown, RenderOptions};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// What a conversion produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConvertMode {
    /// Markdown rendering of the whole document
    #[default]
    Markdown,

    /// Pattern-based field extraction (PDF only)
    Fields,
}

/// Options for document conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Output mode
    pub mode: ConvertMode,

    /// Parsing options
    pub parse: ParseOptions,

    /// Rendering options
    pub render: RenderOptions,

    /// Field patterns; the built-in registry when `None`
    pub patterns: Option<Arc<PatternRegistry>>,

    /// Original file name, reported in extracted fields
    pub source_name: Option<String>,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output mode.
    pub fn with_mode(mut self, mode: ConvertMode) -> Self {
        self.mode = mode;
        self
    }

    /// Extract fields instead of rendering Markdown.
    pub fn fields(mut self) -> Self {
        self.mode = ConvertMode::Fields;
        self
    }

    /// Set parsing options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Use a custom pattern registry for field extraction.
    pub fn with_patterns(mut self, patterns: PatternRegistry) -> Self {
        self.patterns = Some(Arc::new(patterns));
        self
    }

    /// Set the original file name.
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    /// The pattern registry in effect.
    pub fn pattern_registry(&self) -> &PatternRegistry {
        self.patterns
            .as_deref()
            .unwrap_or_else(|| PatternRegistry::standard())
    }

    /// File name reported for a document of the given kind.
    pub fn source_name_or_default(&self, kind: DocumentKind) -> String {
        self.source_name
            .clone()
            .unwrap_or_else(|| format!("document.{}", kind.extension()))
    }
}

/// Result of a conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertOutput {
    /// Rendered Markdown
    Markdown(String),

    /// Extracted field values
    Fields(ExtractedFields),
}

impl ConvertOutput {
    /// Markdown text, or `None` for field output.
    pub fn as_markdown(&self) -> Option<&str> {
        match self {
            ConvertOutput::Markdown(text) => Some(text),
            ConvertOutput::Fields(_) => None,
        }
    }

    /// Extracted fields, or `None` for Markdown output.
    pub fn as_fields(&self) -> Option<&ExtractedFields> {
        match self {
            ConvertOutput::Fields(fields) => Some(fields),
            ConvertOutput::Markdown(_) => None,
        }
    }

    /// Markdown for either variant; fields render as a report.
    pub fn to_markdown(&self) -> String {
        match self {
            ConvertOutput::Markdown(text) => text.clone(),
            ConvertOutput::Fields(fields) => fields_to_markdown(fields),
        }
    }
}

/// Convert raw document bytes of a declared kind.
///
/// The whole conversion succeeds or fails as a unit; no partial output is
/// returned.
pub fn convert(bytes: &[u8], kind: DocumentKind, options: &ConvertOptions) -> Result<ConvertOutput> {
    log::debug!(
        "converting {} bytes as {} ({:?})",
        bytes.len(),
        kind,
        options.mode
    );
    match kind {
        DocumentKind::Docx => DocxConverter::new().convert_bytes(bytes, options),
        DocumentKind::Pdf => PdfConverter::new().convert_bytes(bytes, options),
    }
}

/// Convert raw bytes, deriving the document kind from the original file
/// name.
pub fn convert_named(
    bytes: &[u8],
    file_name: &str,
    options: &ConvertOptions,
) -> Result<ConvertOutput> {
    let kind = DocumentKind::from_file_name(file_name)?;
    let options = options.clone().with_source_name(file_name);
    convert(bytes, kind, &options)
}

/// Trait for document converters.
///
/// Implement this trait to add support for a new document format.
pub trait DocumentConverter: Send + Sync {
    /// Get the supported file extensions for this converter.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["pdf"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Get the name of this converter.
    fn name(&self) -> &str;

    /// Convert from bytes.
    fn convert_bytes(&self, bytes: &[u8], options: &ConvertOptions) -> Result<ConvertOutput>;

    /// Convert a file at the given path.
    fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertOutput> {
        let bytes = std::fs::read(path)?;
        let mut options = options.clone();
        if options.source_name.is_none() {
            options.source_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string);
        }
        self.convert_bytes(&bytes, &options)
    }

    /// Check if this converter supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry for document converters.
///
/// The registry maps file extensions to converters and provides
/// convenient methods for converting documents.
pub struct ConverterRegistry {
    converters: HashMap<String, Arc<dyn DocumentConverter>>,
    by_name: HashMap<String, Arc<dyn DocumentConverter>>,
}

impl ConverterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the DOCX and PDF converters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DocxConverter::new()));
        registry.register(Arc::new(PdfConverter::new()));
        registry
    }

    /// Register a converter.
    ///
    /// The converter will be registered for all its supported extensions.
    pub fn register(&mut self, converter: Arc<dyn DocumentConverter>) {
        for ext in converter.supported_extensions() {
            self.converters
                .insert(ext.to_lowercase(), converter.clone());
        }
        self.by_name
            .insert(converter.name().to_lowercase(), converter);
    }

    /// Get a converter by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.converters.get(&ext.to_lowercase()).cloned()
    }

    /// Get a converter by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.converters.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.converters.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// Convert a file using the appropriate converter.
    pub fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertOutput> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::UnsupportedFormat("file has no extension".into()))?;

        self.converter_for(ext)?.convert(path, options)
    }

    /// Convert bytes, picking the converter from the file name's extension.
    pub fn convert_bytes(
        &self,
        bytes: &[u8],
        file_name: &str,
        options: &ConvertOptions,
    ) -> Result<ConvertOutput> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                Error::UnsupportedFormat(format!("'{}' has no extension", file_name))
            })?;

        let options = options.clone().with_source_name(file_name);
        self.converter_for(ext)?.convert_bytes(bytes, &options)
    }

    fn converter_for(&self, ext: &str) -> Result<Arc<dyn DocumentConverter>> {
        self.get_by_extension(ext)
            .ok_or_else(|| Error::UnsupportedFormat(format!("no converter for extension: {}", ext)))
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new()
            .fields()
            .with_source_name("a.pdf")
            .with_parse_options(ParseOptions::new().sequential());

        assert_eq!(options.mode, ConvertMode::Fields);
        assert_eq!(options.source_name.as_deref(), Some("a.pdf"));
        assert!(!options.parse.parallel);
        assert_eq!(options.pattern_registry().len(), 2);
    }

    #[test]
    fn test_source_name_default() {
        let options = ConvertOptions::new();
        assert_eq!(options.source_name_or_default(DocumentKind::Pdf), "document.pdf");
    }

    #[test]
    fn test_registry_with_defaults() {
        let registry = ConverterRegistry::with_defaults();
        assert!(registry.supports("pdf"));
        assert!(registry.supports("PDF"));
        assert!(registry.supports("docx"));
        assert!(!registry.supports("doc"));
        assert_eq!(registry.supported_extensions(), vec!["docx", "pdf"]);
    }

    #[test]
    fn test_registry_get_by_name() {
        let registry = ConverterRegistry::with_defaults();
        assert_eq!(registry.get_by_name("DOCX").unwrap().name(), "docx");
        assert!(registry.get_by_name("html").is_none());
    }

    #[test]
    fn test_registry_unknown_extension() {
        let registry = ConverterRegistry::with_defaults();
        let err = registry
            .convert_bytes(b"data", "notes.txt", &ConvertOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));

        let err = registry
            .convert_bytes(b"data", "README", &ConvertOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_convert_named_unknown_kind_before_parsing() {
        // garbage bytes would be CorruptInput if parsing were attempted
        let err = convert_named(b"garbage", "image.png", &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_docx_fields_mode_unsupported() {
        let err = convert(
            b"PK\x03\x04",
            DocumentKind::Docx,
            &ConvertOptions::new().fields(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_output_accessors() {
        let output = ConvertOutput::Markdown("# T".to_string());
        assert_eq!(output.as_markdown(), Some("# T"));
        assert!(output.as_fields().is_none());
        assert_eq!(output.to_markdown(), "# T");
    }
}
