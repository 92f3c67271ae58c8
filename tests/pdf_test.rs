//! End-to-end PDF conversion tests on generated documents.

mod common;

use common::{at, pdf, pdf_from_streams, pdf_with_broken_second_page, pdf_with_form_xobject};
use docmark::convert::{convert, ConvertOptions, ConvertOutput};
use docmark::parser::{LopdfBackend, PdfPageExtractor};
use docmark::{DocumentKind, Error, ParseOptions, NOT_FOUND, NO_CONTENT_SENTINEL};

fn markdown(bytes: &[u8]) -> String {
    match convert(bytes, DocumentKind::Pdf, &ConvertOptions::default()).unwrap() {
        ConvertOutput::Markdown(text) => text,
        other => panic!("expected markdown, got {:?}", other),
    }
}

#[test]
fn test_reading_order_restored() {
    // content stream order differs from visual order
    let bytes = pdf(&[vec![
        at("world", 150, 700),
        at("Second line", 72, 680),
        at("Hello", 72, 702),
    ]]);
    assert_eq!(markdown(&bytes), "Hello world\nSecond line");
}

#[test]
fn test_headings_promoted_across_pages() {
    let bytes = pdf(&[
        vec![at("ANNUAL REPORT SUMMARY", 72, 750), at("Intro text", 72, 700)],
        vec![at("1. Introduction", 72, 750), at("Hello world", 72, 700)],
    ]);
    assert_eq!(
        markdown(&bytes),
        "## ANNUAL REPORT SUMMARY\nIntro text\n\n### 1. Introduction\nHello world"
    );
}

#[test]
fn test_empty_pages_yield_sentinel() {
    let bytes = pdf(&[vec![], vec![]]);
    assert_eq!(markdown(&bytes), NO_CONTENT_SENTINEL);
}

#[test]
fn test_whitespace_fragments_dropped() {
    let bytes = pdf(&[vec![at("   ", 72, 700), at("kept", 72, 650)]]);
    assert_eq!(markdown(&bytes), "kept");
}

#[test]
fn test_sequential_matches_parallel() {
    let pages: Vec<_> = (0..8)
        .map(|_| vec![at("BODY", 72, 700), at("more", 72, 600)])
        .collect();
    let bytes = pdf(&pages);
    let parallel = markdown(&bytes);
    let options = ConvertOptions::new().with_parse_options(ParseOptions::new().sequential());
    let sequential = convert(&bytes, DocumentKind::Pdf, &options).unwrap();
    assert_eq!(sequential.as_markdown(), Some(parallel.as_str()));
}

#[test]
fn test_fields_extracted() {
    let bytes = pdf(&[vec![
        at("Factura 0001", 72, 750),
        at("Lote: A-123", 72, 700),
        at("Observaciones", 72, 650),
    ]]);
    let options = ConvertOptions::new().fields().with_source_name("factura.pdf");
    let output = convert(&bytes, DocumentKind::Pdf, &options).unwrap();
    let fields = output.as_fields().unwrap();
    assert_eq!(fields.get("filename"), Some("factura.pdf"));
    assert_eq!(fields.get("lote"), Some("A-123"));
    assert_eq!(fields.get("total"), Some(NOT_FOUND));
}

#[test]
fn test_fields_match_across_fragments_on_one_line() {
    let bytes = pdf(&[vec![at("Total a pagar:", 72, 700), at("$1,250.00", 300, 701)]]);
    let output = convert(&bytes, DocumentKind::Pdf, &ConvertOptions::new().fields()).unwrap();
    let fields = output.as_fields().unwrap();
    assert_eq!(fields.get("total"), Some("1,250.00"));
    assert_eq!(fields.get("filename"), Some("document.pdf"));
}

#[test]
fn test_extractor_over_lopdf_backend() {
    let bytes = pdf(&[vec![at("one", 10, 20)], vec![at("two", 30, 40)]]);
    let backend = LopdfBackend::load_bytes(&bytes).unwrap();
    assert_eq!(backend.page_count(), 2);

    let extractor = PdfPageExtractor::new(&backend);
    let page = extractor.extract_page(2).unwrap();
    assert_eq!(page.number, 2);
    assert_eq!(page.fragments.len(), 1);
    assert_eq!(page.fragments[0].text, "two");
    assert_eq!((page.fragments[0].x, page.fragments[0].y), (30.0, 40.0));
}

#[test]
fn test_tj_array_in_real_stream() {
    let stream = b"BT /F1 12 Tf 72 700 Td [(Lote) -300 (N:) -250 (B-7)] TJ ET".to_vec();
    let bytes = pdf_from_streams(&[stream]);
    assert_eq!(markdown(&bytes), "Lote N: B-7");
}

#[test]
fn test_broken_page_content_aborts() {
    let bytes = pdf_with_broken_second_page();
    let result = convert(&bytes, DocumentKind::Pdf, &ConvertOptions::default());
    match result {
        Err(Error::CorruptInput(msg)) => assert!(msg.contains("page 2")),
        other => panic!("expected corrupt input, got {:?}", other),
    }
}

#[test]
fn test_conversion_is_deterministic() {
    let bytes = pdf(&[vec![
        at("b", 200, 500),
        at("a", 100, 502),
        at("HEADING LINE HERE", 72, 700),
    ]]);
    let first = markdown(&bytes);
    for _ in 0..5 {
        assert_eq!(markdown(&bytes), first);
    }
    assert_eq!(first, "## HEADING LINE HERE\na b");
}

#[test]
fn test_flipped_page_coordinates() {
    // y grows downward after the cm; Tm flips glyphs back upright
    let stream = b"1 0 0 -1 0 792 cm BT /F1 12 Tf \
        1 0 0 -1 72 100 Tm (Top line) Tj \
        1 0 0 -1 72 700 Tm (Bottom line) Tj ET"
        .to_vec();
    let bytes = pdf_from_streams(&[stream]);
    assert_eq!(markdown(&bytes), "Top line\nBottom line");
}

#[test]
fn test_scaled_page_bands_in_page_units() {
    // 8 text units apart vertically, 4 on the page
    let stream = b"0.5 0 0 0.5 0 0 cm BT /F1 12 Tf \
        1 0 0 1 144 1400 Tm (a) Tj \
        1 0 0 1 300 1392 Tm (b) Tj ET"
        .to_vec();
    let bytes = pdf_from_streams(&[stream]);
    assert_eq!(markdown(&bytes), "a b");

    let backend = LopdfBackend::load_bytes(&bytes).unwrap();
    let page = PdfPageExtractor::new(&backend).extract_page(1).unwrap();
    let origins: Vec<(f64, f64)> = page.fragments.iter().map(|f| (f.x, f.y)).collect();
    assert_eq!(origins, vec![(72.0, 700.0), (150.0, 696.0)]);
}

#[test]
fn test_form_xobject_text_extracted() {
    let bytes = pdf_with_form_xobject(
        b"q /Fm1 Do Q",
        b"BT /F1 12 Tf 72 700 Td (Lote: Z-9) Tj ET",
        None,
    );
    assert_eq!(markdown(&bytes), "Lote: Z-9");

    let output = convert(&bytes, DocumentKind::Pdf, &ConvertOptions::new().fields()).unwrap();
    assert_eq!(output.as_fields().unwrap().get("lote"), Some("Z-9"));
}

#[test]
fn test_form_xobject_matrix_applied() {
    let bytes = pdf_with_form_xobject(
        b"BT /F1 12 Tf 72 500 Td (Page text) Tj ET /Fm1 Do",
        b"BT /F1 12 Tf 72 400 Td (Form text) Tj ET",
        Some([1, 0, 0, 1, 0, 200]),
    );
    // the form's /Matrix lifts its text above the page text
    assert_eq!(markdown(&bytes), "Form text\nPage text");
}


#[cfg(feature = "async")]
#[tokio::test]
async fn test_convert_async_matches_blocking() {
    let bytes = pdf(&[vec![at("Lote: A-123", 72, 700), at("Total: 9.50", 72, 680)]]);
    let options = ConvertOptions::new().fields();
    let blocking = docmark::convert::convert_named(&bytes, "factura.pdf", &options).unwrap();

    let output = docmark::convert_async(bytes, "factura.pdf".to_string(), options)
        .await
        .unwrap();
    assert_eq!(output, blocking);
    assert_eq!(output.as_fields().unwrap().get("filename"), Some("factura.pdf"));
}

#[cfg(feature = "async")]
#[tokio::test]
async fn test_convert_async_unsupported_format() {
    let result =
        docmark::convert_async(b"plain".to_vec(), "notes.txt".to_string(), ConvertOptions::new())
            .await;
    assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
}
