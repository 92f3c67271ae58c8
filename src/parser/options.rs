//! Parsing options and configuration.

use crate::style::StyleMap;

/// Options for parsing source documents.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Reconstruct PDF pages in parallel
    pub parallel: bool,

    /// Style map for DOCX documents; the built-in map when `None`
    pub style_map: Option<StyleMap>,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Use a custom style map for DOCX documents.
    pub fn with_style_map(mut self, styles: StyleMap) -> Self {
        self.style_map = Some(styles);
        self
    }

    /// The style map in effect.
    pub fn styles(&self) -> &StyleMap {
        self.style_map.as_ref().unwrap_or_else(|| StyleMap::standard())
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            style_map: None,
        }
    }
}
