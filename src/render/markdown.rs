//! Markdown serialization for rich-text documents.

use regex::Regex;
use std::sync::OnceLock;

use crate::model::{Block, RichDocument, Run, RunStyle};

use super::{CleanupPipeline, RenderOptions, NO_CONTENT_SENTINEL};

/// Serialize a rich-text document to Markdown.
///
/// Never fails: a document that yields no text produces
/// [`NO_CONTENT_SENTINEL`].
///
/// # Example
///
/// ```
/// use docmark::model::{RichDocument, Run};
/// use docmark::render::{to_markdown, RenderOptions};
///
/// let mut doc = RichDocument::new();
/// doc.push_paragraph(vec![Run::plain("hello")]);
/// assert_eq!(to_markdown(&doc, &RenderOptions::default()), "hello");
/// ```
pub fn to_markdown(doc: &RichDocument, options: &RenderOptions) -> String {
    MarkdownRenderer::new(options.clone()).render(doc)
}

/// Rich-text to Markdown renderer.
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a document to Markdown.
    pub fn render(&self, doc: &RichDocument) -> String {
        let mut output = String::new();
        for block in &doc.blocks {
            self.render_block(&mut output, block);
        }

        if let Some(ref cleanup_options) = self.options.cleanup {
            let pipeline = CleanupPipeline::new(cleanup_options.clone());
            output = pipeline.process(&output);
        }

        let markdown = normalize_newlines(&output);
        if markdown.is_empty() {
            NO_CONTENT_SENTINEL.to_string()
        } else {
            markdown
        }
    }

    fn render_block(&self, output: &mut String, block: &Block) {
        match block {
            Block::Paragraph(runs) => {
                for run in runs {
                    self.render_run(output, run);
                }
                output.push_str("\n\n");
            }
            Block::LineBreak => output.push('\n'),
        }
    }

    fn render_run(&self, output: &mut String, run: &Run) {
        match run.style {
            RunStyle::Heading(level) => {
                // A heading always owns its line
                if !output.is_empty() && !output.ends_with('\n') {
                    output.push('\n');
                }
                output.push_str(&"#".repeat(level.clamp(1, 6) as usize));
                output.push(' ');
                self.render_content(output, run);
                output.push_str("\n\n");
            }
            RunStyle::Strong => {
                output.push_str("**");
                self.render_content(output, run);
                output.push_str("**");
            }
            RunStyle::Emphasis => {
                output.push('*');
                self.render_content(output, run);
                output.push('*');
            }
            RunStyle::Plain => self.render_content(output, run),
        }
    }

    /// The run's own text followed by its nested runs.
    fn render_content(&self, output: &mut String, run: &Run) {
        if self.options.escape_special_chars {
            output.push_str(&escape_markdown(&run.text));
        } else {
            output.push_str(&run.text);
        }
        for child in &run.children {
            self.render_run(output, child);
        }
    }
}

/// Collapse 3+ newlines to a paragraph break and trim the result.
pub(crate) fn normalize_newlines(text: &str) -> String {
    static EXTRA_NEWLINES: OnceLock<Regex> = OnceLock::new();
    let re = EXTRA_NEWLINES.get_or_init(|| Regex::new(r"\n{3,}").expect("valid regex"));
    re.replace_all(text, "\n\n").trim().to_string()
}

/// Escape special Markdown characters.
/// Only escape characters that could be misinterpreted as Markdown syntax.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '|' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(doc: &RichDocument) -> String {
        to_markdown(doc, &RenderOptions::default())
    }

    fn paragraph(runs: Vec<Run>) -> RichDocument {
        let mut doc = RichDocument::new();
        doc.push_paragraph(runs);
        doc
    }

    #[test]
    fn test_single_plain_paragraph() {
        assert_eq!(render(&paragraph(vec![Run::plain("hello")])), "hello");
    }

    #[test]
    fn test_empty_document_sentinel() {
        assert_eq!(render(&RichDocument::new()), NO_CONTENT_SENTINEL);
    }

    #[test]
    fn test_whitespace_only_document_sentinel() {
        let mut doc = paragraph(vec![Run::plain("  ")]);
        doc.push(Block::LineBreak);
        assert_eq!(render(&doc), NO_CONTENT_SENTINEL);
    }

    #[test]
    fn test_emphasis_markers() {
        let doc = paragraph(vec![
            Run::plain("a "),
            Run::strong("bold"),
            Run::plain(" and "),
            Run::emphasis("italic"),
        ]);
        assert_eq!(render(&doc), "a **bold** and *italic*");
    }

    #[test]
    fn test_nested_strong_emphasis() {
        let doc = paragraph(vec![Run::wrapping(
            RunStyle::Strong,
            vec![Run::emphasis("both")],
        )]);
        assert_eq!(render(&doc), "***both***");
    }

    #[test]
    fn test_heading_levels_and_paragraph_separation() {
        let mut doc = RichDocument::new();
        doc.push_paragraph(vec![Run::heading(1, "Title")]);
        doc.push_paragraph(vec![Run::plain("Body text.")]);
        doc.push_paragraph(vec![Run::heading(3, "Sub")]);
        assert_eq!(render(&doc), "# Title\n\nBody text.\n\n### Sub");
    }

    #[test]
    fn test_heading_keeps_nested_markers() {
        let doc = paragraph(vec![Run::wrapping(
            RunStyle::Heading(2),
            vec![Run::plain("Scope of "), Run::strong("work")],
        )]);
        assert_eq!(render(&doc), "## Scope of **work**");
    }

    #[test]
    fn test_heading_run_forced_onto_own_line() {
        let doc = paragraph(vec![Run::plain("lead-in"), Run::heading(2, "Inline")]);
        assert_eq!(render(&doc), "lead-in\n## Inline");
    }

    #[test]
    fn test_empty_heading_still_emits_marker() {
        let mut doc = paragraph(vec![Run::heading(1, "")]);
        doc.push_paragraph(vec![Run::plain("after")]);
        assert_eq!(render(&doc), "# \n\nafter");
    }

    #[test]
    fn test_line_breaks_collapse() {
        let mut doc = paragraph(vec![Run::plain("one")]);
        doc.push(Block::LineBreak);
        doc.push(Block::LineBreak);
        doc.push_paragraph(vec![Run::plain("two")]);
        assert_eq!(render(&doc), "one\n\ntwo");
    }

    #[test]
    fn test_line_break_inside_paragraph_text() {
        let doc = paragraph(vec![Run::plain("a\nb")]);
        assert_eq!(render(&doc), "a\nb");
    }

    #[test]
    fn test_serialize_is_deterministic() {
        let mut doc = RichDocument::new();
        doc.push_paragraph(vec![Run::heading(2, "Repeat")]);
        doc.push_paragraph(vec![Run::strong("x"), Run::plain(" y")]);
        let first = render(&doc);
        for _ in 0..5 {
            assert_eq!(render(&doc), first);
        }
    }

    #[test]
    fn test_escape_option() {
        let doc = paragraph(vec![Run::plain("a*b_[c]")]);
        let options = RenderOptions::new().with_escape(true);
        assert_eq!(to_markdown(&doc, &options), "a\\*b\\_\\[c\\]");
        assert_eq!(render(&doc), "a*b_[c]");
    }

    #[test]
    fn test_normalize_newlines() {
        assert_eq!(normalize_newlines("\n\na\n\n\n\nb\n"), "a\n\nb");
    }
}
