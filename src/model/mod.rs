//! Document model types.
//!
//! Two intermediate representations sit between parsing and rendering:
//! a style-tagged rich-text tree for word-processing documents, and
//! page-positioned fragments for PDF pages.

mod fragment;
mod rich;

pub use fragment::{PageFragments, PositionedFragment};
pub use rich::{Block, RichDocument, Run, RunStyle};
