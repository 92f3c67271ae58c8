//! Reading-order reconstruction for PDF pages.
//!
//! Text fragments arrive in content-stream order, which need not match the
//! visual order. Fragments are grouped into lines by baseline proximity,
//! lines are read top to bottom and fragments within a line left to right.

use std::cmp::Ordering;

use rayon::prelude::*;

use crate::model::{PageFragments, PositionedFragment};

/// Maximum baseline distance, in page units, for two fragments to share a
/// line. Inclusive.
pub const SAME_LINE_THRESHOLD: f64 = 5.0;

/// Separator placed between the texts of consecutive pages.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Whether two fragments sit on the same visual line.
pub fn same_line(a: &PositionedFragment, b: &PositionedFragment) -> bool {
    (a.y - b.y).abs() <= SAME_LINE_THRESHOLD
}

/// Total order used before banding: top to bottom, then left to right,
/// then by text so identical positions still order deterministically.
fn page_order(a: &PositionedFragment, b: &PositionedFragment) -> Ordering {
    b.y.total_cmp(&a.y)
        .then_with(|| a.x.total_cmp(&b.x))
        .then_with(|| a.text.cmp(&b.text))
}

/// Order within a line: left to right.
fn line_order(a: &PositionedFragment, b: &PositionedFragment) -> Ordering {
    a.x.total_cmp(&b.x)
        .then_with(|| b.y.total_cmp(&a.y))
        .then_with(|| a.text.cmp(&b.text))
}

/// Group fragments into visual lines, top line first.
///
/// A tolerance comparison is not transitive, so it cannot drive a sort
/// directly. Fragments are sorted totally by position first; each line then
/// collects the following fragments that are within [`SAME_LINE_THRESHOLD`]
/// of its first member. The grouping depends only on the set of fragments,
/// never on their input order.
pub fn group_lines(fragments: &[PositionedFragment]) -> Vec<Vec<&PositionedFragment>> {
    let mut sorted: Vec<&PositionedFragment> = fragments.iter().collect();
    sorted.sort_by(|a, b| page_order(a, b));

    let mut lines: Vec<Vec<&PositionedFragment>> = Vec::new();
    for fragment in sorted {
        match lines.last_mut() {
            Some(line) if same_line(line[0], fragment) => line.push(fragment),
            _ => lines.push(vec![fragment]),
        }
    }

    for line in &mut lines {
        line.sort_by(|a, b| line_order(a, b));
    }
    lines
}

/// Reconstruct the reading-order text of one page.
///
/// Fragment texts are trimmed and joined with single spaces; a line break
/// separates visual lines.
///
/// # Example
///
/// ```
/// use docmark::model::PositionedFragment;
/// use docmark::parser::layout::reconstruct;
///
/// let frags = vec![
///     PositionedFragment::new("world", 60.0, 700.0).unwrap(),
///     PositionedFragment::new("Second line", 10.0, 680.0).unwrap(),
///     PositionedFragment::new("Hello", 10.0, 702.0).unwrap(),
/// ];
/// assert_eq!(reconstruct(&frags), "Hello world\nSecond line");
/// ```
pub fn reconstruct(fragments: &[PositionedFragment]) -> String {
    let mut text = String::new();
    let mut last: Option<&PositionedFragment> = None;

    for line in group_lines(fragments) {
        let mut line_start = true;
        for fragment in line {
            let line_break = match last {
                Some(prev) => line_start || !same_line(prev, fragment),
                None => false,
            };
            if line_break {
                let trimmed = text.trim_end_matches(' ').len();
                text.truncate(trimmed);
                text.push('\n');
            }
            text.push_str(fragment.text.trim());
            text.push(' ');
            last = Some(fragment);
            line_start = false;
        }
    }

    text.trim_end().to_string()
}

/// Join page texts in ascending page number, whatever order they arrive in.
/// Pages without text are skipped.
pub fn assemble_pages<I>(pages: I) -> String
where
    I: IntoIterator<Item = (u32, String)>,
{
    let mut pages: Vec<(u32, String)> = pages.into_iter().collect();
    pages.sort_by_key(|(number, _)| *number);
    pages
        .into_iter()
        .filter(|(_, text)| !text.is_empty())
        .map(|(_, text)| text)
        .collect::<Vec<_>>()
        .join(PAGE_SEPARATOR)
}

/// Reconstruct every page and join them into one document text.
///
/// With `parallel`, pages are reconstructed on the rayon pool; page order
/// is restored before joining.
pub fn reconstruct_pages(pages: &[PageFragments], parallel: bool) -> String {
    let texts: Vec<(u32, String)> = if parallel {
        pages
            .par_iter()
            .map(|page| (page.number, reconstruct(&page.fragments)))
            .collect()
    } else {
        pages
            .iter()
            .map(|page| (page.number, reconstruct(&page.fragments)))
            .collect()
    };
    assemble_pages(texts)
}
