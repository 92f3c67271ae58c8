//! Page-positioned text types produced by PDF extraction.

use serde::{Deserialize, Serialize};

/// A contiguous run of glyphs placed on a PDF page.
///
/// Coordinates are in the page's user space: origin at the bottom-left,
/// y increasing upward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedFragment {
    /// The text content, non-empty after trimming
    pub text: String,
    /// X position of the text origin
    pub x: f64,
    /// Y position of the text origin (baseline)
    pub y: f64,
}

impl PositionedFragment {
    /// Create a fragment, or `None` if the text is blank.
    ///
    /// Blank fragments carry no reading-order information and are never
    /// admitted into a page.
    pub fn new(text: impl Into<String>, x: f64, y: f64) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return None;
        }
        Some(Self { text, x, y })
    }
}

/// The fragments extracted from one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageFragments {
    /// Page number (1-indexed)
    pub number: u32,
    /// Fragments in content-stream order
    pub fragments: Vec<PositionedFragment>,
}

impl PageFragments {
    /// Create an empty page.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            fragments: Vec::new(),
        }
    }

    /// Add a fragment if its text is not blank.
    pub fn push(&mut self, text: impl Into<String>, x: f64, y: f64) {
        if let Some(fragment) = PositionedFragment::new(text, x, y) {
            self.fragments.push(fragment);
        }
    }

    /// Number of fragments on the page.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Check if the page has no fragments.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}
