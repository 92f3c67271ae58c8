//! Heading promotion for reconstructed PDF text.
//!
//! Reconstructed text carries no font information, so headings are guessed
//! from the shape of each line. Two rules apply, checked in order:
//!
//! 1. A line made only of uppercase letters and spaces, at least
//!    [`MIN_CAPS_HEADING_LEN`] characters long, becomes `## line`.
//! 2. A numbered section line such as `1. Introduction` becomes `### line`.
//!
//! False positives and negatives are accepted.

use regex::Regex;
use std::sync::OnceLock;

/// Minimum length, in characters, of an all-caps line promoted to a heading.
pub const MIN_CAPS_HEADING_LEN: usize = 11;

/// Normalize whitespace and promote heading-like lines.
///
/// Applied once to the whole-document text, after all pages are joined.
///
/// # Example
///
/// ```
/// use docmark::render::headings::annotate;
///
/// let text = "ANNUAL REPORT SUMMARY\n1. Introduction\nHello world";
/// assert_eq!(
///     annotate(text),
///     "## ANNUAL REPORT SUMMARY\n### 1. Introduction\nHello world"
/// );
/// ```
pub fn annotate(text: &str) -> String {
    normalize_whitespace(text)
        .lines()
        .map(|line| match classify(line) {
            Some(level) => format!("{} {}", "#".repeat(level as usize), line),
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Heading level a single (already trimmed) line is promoted to.
pub fn classify(line: &str) -> Option<u8> {
    if is_caps_heading(line) {
        Some(2)
    } else if is_numbered_section(line) {
        Some(3)
    } else {
        None
    }
}

fn is_caps_heading(line: &str) -> bool {
    line.chars().count() >= MIN_CAPS_HEADING_LEN
        && line.chars().any(char::is_uppercase)
        && line.chars().all(|c| c == ' ' || c.is_uppercase())
}

fn is_numbered_section(line: &str) -> bool {
    static NUMBERED: OnceLock<Regex> = OnceLock::new();
    NUMBERED
        .get_or_init(|| Regex::new(r"^\d+\. \p{Lu}[^.]*$").expect("valid regex"))
        .is_match(line)
}

/// Collapse runs of horizontal whitespace (including no-break spaces),
/// trim every line and keep at most one blank line
/// between text lines. Leading and trailing blank lines are dropped.
pub fn normalize_whitespace(text: &str) -> String {
    static SPACES: OnceLock<Regex> = OnceLock::new();
    let spaces = SPACES.get_or_init(|| Regex::new(r"[\s&&[^\n]]+").expect("valid regex"));

    let mut lines: Vec<String> = Vec::new();
    for raw in text.lines() {
        let line = spaces.replace_all(raw, " ").trim().to_string();
        if line.is_empty() && lines.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caps_line_promoted() {
        assert_eq!(annotate("ANNUAL REPORT SUMMARY"), "## ANNUAL REPORT SUMMARY");
    }

    #[test]
    fn test_numbered_section_promoted() {
        assert_eq!(annotate("1. Introduction"), "### 1. Introduction");
        assert_eq!(annotate("12. Scope of work"), "### 12. Scope of work");
    }

    #[test]
    fn test_plain_line_untouched() {
        assert_eq!(annotate("Hello world"), "Hello world");
    }

    #[test]
    fn test_caps_length_boundary() {
        // 10 characters
        assert_eq!(annotate("ABCDE FGHI"), "ABCDE FGHI");
        // 11 characters
        assert_eq!(annotate("ABCDE FGHIJ"), "## ABCDE FGHIJ");
    }

    #[test]
    fn test_caps_rejects_digits_and_punctuation() {
        assert_eq!(annotate("TOTAL AMOUNT 2024"), "TOTAL AMOUNT 2024");
        assert_eq!(annotate("SECTION ONE: SCOPE"), "SECTION ONE: SCOPE");
    }

    #[test]
    fn test_caps_accepts_accented_uppercase() {
        assert_eq!(annotate("INFORMACIÓN GENERAL"), "## INFORMACIÓN GENERAL");
    }

    #[test]
    fn test_numbered_section_accented_initial() {
        assert_eq!(classify("3. Éxito del proyecto"), Some(3));
        assert_eq!(annotate("4. Órdenes de compra"), "### 4. Órdenes de compra");
        assert_eq!(classify("5. éxito"), None);
    }

    #[test]
    fn test_numbered_section_rejects_trailing_period() {
        assert_eq!(annotate("1. Introduction."), "1. Introduction.");
        assert_eq!(annotate("1. introduction"), "1. introduction");
        assert_eq!(annotate("1.Introduction"), "1.Introduction");
    }

    #[test]
    fn test_caps_rule_checked_first() {
        // Digits keep a numbered line out of the caps rule, so the rules
        // never both match; classification stays stable regardless.
        assert_eq!(classify("1. INTRODUCTION"), Some(3));
        assert_eq!(classify("INTRODUCTION TO THE PLAN"), Some(2));
    }

    #[test]
    fn test_whitespace_normalized_before_rules() {
        let text = "  ANNUAL \t REPORT   SUMMARY  \n\n\n\nbody  text\n\n";
        assert_eq!(annotate(text), "## ANNUAL REPORT SUMMARY\n\nbody text");
    }

    #[test]
    fn test_no_break_spaces_collapsed() {
        let text = "ANNUAL\u{00A0}REPORT\u{00A0}\u{00A0}SUMMARY\u{00A0}";
        assert_eq!(annotate(text), "## ANNUAL REPORT SUMMARY");
        assert_eq!(normalize_whitespace("a\u{2009}\u{00A0}b\r"), "a b");
    }

    #[test]
    fn test_normalize_whitespace_drops_leading_blank_lines() {
        assert_eq!(normalize_whitespace("\n\n a \n"), "a");
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn test_mixed_document() {
        let text = "GENERAL CONDITIONS\nSome intro text.\n\n2. Payment terms\nPay on time.";
        assert_eq!(
            annotate(text),
            "## GENERAL CONDITIONS\nSome intro text.\n\n### 2. Payment terms\nPay on time."
        );
    }
}
