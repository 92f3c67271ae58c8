//! Rendering module for converting parsed content to output formats.

mod cleanup;
pub mod headings;
mod json;
mod markdown;
mod options;
pub mod report;

pub use cleanup::{CleanupOptions, CleanupPipeline, CleanupPreset};
pub use headings::annotate;
pub use json::{to_json, JsonFormat};
pub use markdown::{to_markdown, MarkdownRenderer};
pub use options::RenderOptions;
pub use report::{fields_to_markdown, output_file_name};

/// Output returned when a document yields no text.
pub const NO_CONTENT_SENTINEL: &str = "No content could be extracted from the document.";
