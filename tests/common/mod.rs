//! Fixture builders shared by the integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use zip::write::SimpleFileOptions;

const W_NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

/// Build a DOCX container from a `<w:body>` fragment and optional
/// `<w:styles>` content.
pub fn docx(body: &str, styles: Option<&str>) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    writer
        .start_file("[Content_Types].xml", options)
        .expect("start content types");
    writer
        .write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Types/>"#)
        .expect("write content types");

    writer
        .start_file("word/document.xml", options)
        .expect("start document part");
    write!(
        writer,
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {}><w:body>{}</w:body></w:document>"#,
        W_NS, body
    )
    .expect("write document part");

    if let Some(styles) = styles {
        writer
            .start_file("word/styles.xml", options)
            .expect("start styles part");
        write!(writer, r#"<w:styles {}>{}</w:styles>"#, W_NS, styles).expect("write styles");
    }

    writer.finish().expect("finish zip").into_inner()
}

/// Style definitions as Word writes them: ids without spaces, lowercase
/// built-in names.
pub fn word_heading_styles() -> &'static str {
    r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
       <w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/></w:style>
       <w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/></w:style>
       <w:style w:type="paragraph" w:styleId="Heading3"><w:name w:val="heading 3"/></w:style>"#
}

/// A paragraph with one plain run.
pub fn para(text: &str) -> String {
    format!(
        r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        text
    )
}

/// A paragraph with a paragraph style.
pub fn styled_para(style_id: &str, text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:pStyle w:val="{}"/></w:pPr><w:r><w:t>{}</w:t></w:r></w:p>"#,
        style_id, text
    )
}

/// One text show at a fixed position.
pub struct Placed<'a> {
    pub text: &'a str,
    pub x: i64,
    pub y: i64,
}

pub fn at(text: &str, x: i64, y: i64) -> Placed<'_> {
    Placed { text, x, y }
}

/// Build a PDF whose pages place the given strings with `Tm`, in the
/// listed order.
pub fn pdf(pages: &[Vec<Placed<'_>>]) -> Vec<u8> {
    let streams: Vec<Vec<u8>> = pages
        .iter()
        .map(|page| {
            let mut content = String::from("BT\n/F1 12 Tf\n");
            for placed in page {
                content.push_str(&format!(
                    "1 0 0 1 {} {} Tm\n({}) Tj\n",
                    placed.x,
                    placed.y,
                    escape_pdf_string(placed.text)
                ));
            }
            content.push_str("ET\n");
            content.into_bytes()
        })
        .collect();
    pdf_from_streams(&streams)
}

/// Build a PDF from raw content streams, one per page.
pub fn pdf_from_streams(streams: &[Vec<u8>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut page_ids: Vec<Object> = Vec::new();
    for stream in streams {
        let content_id = doc.add_object(Object::Stream(Stream::new(
            lopdf::Dictionary::new(),
            stream.clone(),
        )));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => Object::Dictionary(dictionary! {
                "Font" => Object::Dictionary(dictionary! {
                    "F1" => font_id,
                }),
            }),
        });
        page_ids.push(page_id.into());
    }

    save_with_pages(doc, pages_id, page_ids)
}

/// Attach the page tree and catalog, then serialize.
fn save_with_pages(mut doc: Document, pages_id: ObjectId, page_ids: Vec<Object>) -> Vec<u8> {
    let count = page_ids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save test PDF");
    buf
}

/// One page whose content invokes form XObject `/Fm1`. The form declares
/// its own font resources; `matrix` becomes its `/Matrix` when given.
pub fn pdf_with_form_xobject(page: &[u8], form: &[u8], matrix: Option<[i64; 6]>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut form_dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Form",
        "BBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Resources" => Object::Dictionary(dictionary! {
            "Font" => Object::Dictionary(dictionary! { "F1" => font_id }),
        }),
    };
    if let Some(m) = matrix {
        form_dict.set("Matrix", m.iter().map(|&v| Object::Integer(v)).collect::<Vec<_>>());
    }
    let form_id = doc.add_object(Object::Stream(Stream::new(form_dict, form.to_vec())));

    let content_id = doc.add_object(Object::Stream(Stream::new(
        lopdf::Dictionary::new(),
        page.to_vec(),
    )));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => content_id,
        "Resources" => Object::Dictionary(dictionary! {
            "XObject" => Object::Dictionary(dictionary! { "Fm1" => form_id }),
        }),
    });

    save_with_pages(doc, pages_id, vec![page_id.into()])
}

fn escape_pdf_string(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// Two pages; the second page's `Contents` is a number instead of a
/// stream.
pub fn pdf_with_broken_second_page() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let content_id = doc.add_object(Object::Stream(Stream::new(
        lopdf::Dictionary::new(),
        b"BT 72 700 Td (fine) Tj ET".to_vec(),
    )));
    let first = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => content_id,
    });
    let second = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => 42,
    });

    save_with_pages(doc, pages_id, vec![Object::from(first), Object::from(second)])
}
