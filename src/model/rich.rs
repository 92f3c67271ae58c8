//! Style-tagged rich-text document types.

use serde::{Deserialize, Serialize};

/// A parsed word-processing document: an ordered sequence of blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RichDocument {
    /// Blocks in document order
    pub blocks: Vec<Block>,
}

impl RichDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block.
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Append a paragraph made of the given runs.
    pub fn push_paragraph(&mut self, runs: Vec<Run>) {
        self.blocks.push(Block::Paragraph(runs));
    }

    /// Check if the document has no blocks at all.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Plain text of the document, one line per paragraph.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            match block {
                Block::Paragraph(runs) => {
                    for run in runs {
                        run.collect_text(&mut out);
                    }
                    out.push('\n');
                }
                Block::LineBreak => out.push('\n'),
            }
        }
        out
    }
}

impl FromIterator<Block> for RichDocument {
    fn from_iter<I: IntoIterator<Item = Block>>(iter: I) -> Self {
        Self {
            blocks: iter.into_iter().collect(),
        }
    }
}

/// A block-level element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "runs", rename_all = "snake_case")]
pub enum Block {
    /// A paragraph made of runs
    Paragraph(Vec<Run>),
    /// A standalone line break
    LineBreak,
}

/// Style carried by a run. Exactly one per run; compound emphasis is
/// expressed by nesting runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStyle {
    /// No styling
    #[default]
    Plain,
    /// Heading of level 1-6
    Heading(u8),
    /// Strong emphasis (bold)
    Strong,
    /// Emphasis (italic)
    Emphasis,
}

/// A contiguous span of text with one style.
///
/// `children` are rendered after `text`, inside this run's markers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Style of this run
    pub style: RunStyle,
    /// Literal text
    pub text: String,
    /// Nested runs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Run>,
}

impl Run {
    /// Create a run with the given style and text.
    pub fn new(style: RunStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
            children: Vec::new(),
        }
    }

    /// Create an unstyled run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(RunStyle::Plain, text)
    }

    /// Create a bold run.
    pub fn strong(text: impl Into<String>) -> Self {
        Self::new(RunStyle::Strong, text)
    }

    /// Create an italic run.
    pub fn emphasis(text: impl Into<String>) -> Self {
        Self::new(RunStyle::Emphasis, text)
    }

    /// Create a heading run; the level is clamped to 1-6.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::new(RunStyle::Heading(level.clamp(1, 6)), text)
    }

    /// Wrap `children` in a run of the given style with no text of its own.
    pub fn wrapping(style: RunStyle, children: Vec<Run>) -> Self {
        Self {
            style,
            text: String::new(),
            children,
        }
    }

    /// Add a nested run.
    pub fn with_child(mut self, child: Run) -> Self {
        self.children.push(child);
        self
    }

    /// Check if this run and its children carry no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.children.iter().all(Run::is_empty)
    }

    fn collect_text(&self, out: &mut String) {
        out.push_str(&self.text);
        for child in &self.children {
            child.collect_text(out);
        }
    }
}
