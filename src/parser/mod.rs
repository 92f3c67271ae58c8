//! Source document parsing: DOCX rich text and positioned PDF text.

pub mod backend;
mod docx;
pub mod layout;
mod options;
mod pdf;

pub use backend::{LopdfBackend, PdfBackend};
pub use docx::DocxParser;
pub use layout::{assemble_pages, reconstruct, reconstruct_pages, SAME_LINE_THRESHOLD};
pub use options::ParseOptions;
pub use pdf::{PdfPageExtractor, MAX_FORM_DEPTH};
