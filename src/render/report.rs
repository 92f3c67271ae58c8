//! Markdown report for extracted fields and output file naming.

use std::path::Path;

use crate::detect::DocumentKind;
use crate::extract::ExtractedFields;

/// Suffix appended to the stem of a PDF's field report file.
pub const FIELD_REPORT_SUFFIX: &str = "_data";

/// Render extracted fields as a Markdown report.
///
/// ```text
/// # Extracted data from invoice.pdf
///
/// **Lote:** A-123
///
/// **Total:** Not found
/// ```
pub fn fields_to_markdown(fields: &ExtractedFields) -> String {
    let mut output = format!("# Extracted data from {}\n\n", fields.filename);
    for (key, value) in fields.iter() {
        output.push_str(&format!("**{}:** {}\n\n", capitalize(key), value));
    }
    output
}

/// Output file name for a converted document.
///
/// DOCX input becomes `<stem>.md`; PDF input produces a field report named
/// `<stem>_data.md`.
pub fn output_file_name(input: &str, kind: DocumentKind) -> String {
    let stem = file_stem(input);
    match kind {
        DocumentKind::Docx => format!("{}.md", stem),
        DocumentKind::Pdf => format!("{}{}.md", stem, FIELD_REPORT_SUFFIX),
    }
}

/// File name with its last extension removed. Names without a stem
/// (".pdf") are kept whole.
fn file_stem(input: &str) -> &str {
    let name = Path::new(input)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(input);
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
