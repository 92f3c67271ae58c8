//! Mapping from document style names to Markdown markers.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::model::RunStyle;

/// Key under which run-level bold formatting is looked up.
pub const BOLD_KEY: &str = "b";

/// Key under which run-level italic formatting is looked up.
pub const ITALIC_KEY: &str = "i";

/// Markdown-level structural tag a style name maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkdownMarker {
    /// Heading of level 1-6
    Heading(u8),
    /// `**strong**`
    Strong,
    /// `*emphasis*`
    Emphasis,
}

impl From<MarkdownMarker> for RunStyle {
    fn from(marker: MarkdownMarker) -> Self {
        match marker {
            MarkdownMarker::Heading(level) => RunStyle::Heading(level.clamp(1, 6)),
            MarkdownMarker::Strong => RunStyle::Strong,
            MarkdownMarker::Emphasis => RunStyle::Emphasis,
        }
    }
}

/// Table from style names to Markdown markers.
///
/// Keys are matched exactly as the document parser reports them: case and
/// whitespace are significant, so `"Heading 1"` and `"heading 1"` differ.
#[derive(Debug, Clone, Default)]
pub struct StyleMap {
    entries: HashMap<String, MarkdownMarker>,
}

impl StyleMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in map: `Heading 1`..`Heading 6`, bold and italic.
    ///
    /// Built once per process and shared read-only.
    pub fn standard() -> &'static StyleMap {
        static STANDARD: OnceLock<StyleMap> = OnceLock::new();
        STANDARD.get_or_init(|| {
            let mut map = StyleMap::new();
            for level in 1..=6u8 {
                map = map.with_style(format!("Heading {}", level), MarkdownMarker::Heading(level));
            }
            map.with_style(BOLD_KEY, MarkdownMarker::Strong)
                .with_style(ITALIC_KEY, MarkdownMarker::Emphasis)
        })
    }

    /// Add or replace a mapping.
    pub fn with_style(mut self, name: impl Into<String>, marker: MarkdownMarker) -> Self {
        self.entries.insert(name.into(), marker);
        self
    }

    /// Look up the marker for a style name.
    pub fn get(&self, name: &str) -> Option<MarkdownMarker> {
        self.entries.get(name).copied()
    }

    /// Heading level for a paragraph style name, if it maps to a heading.
    pub fn heading_level(&self, name: &str) -> Option<u8> {
        match self.get(name) {
            Some(MarkdownMarker::Heading(level)) => Some(level),
            _ => None,
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
