//! DOCX parser producing a style-tagged [`RichDocument`].
//!
//! Reads `word/styles.xml` to resolve paragraph style ids to style names,
//! then walks `word/document.xml`, tagging paragraphs and runs through a
//! [`StyleMap`]. Tables, images, footnotes and revisions are not modelled;
//! text inside table cells still comes through as ordinary paragraphs.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use crate::detect::check_zip_header;
use crate::error::{Error, Result};
use crate::model::{Block, RichDocument, Run, RunStyle};
use crate::style::{StyleMap, BOLD_KEY, ITALIC_KEY};

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";

/// Parser for Office Open XML word-processing documents.
pub struct DocxParser<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    styles: &'a StyleMap,
}

impl<'a> DocxParser<'a> {
    /// Open a DOCX container held in memory, using the standard style map.
    pub fn from_bytes(data: &'a [u8]) -> Result<Self> {
        Self::from_bytes_with_styles(data, StyleMap::standard())
    }

    /// Open a DOCX container with a custom style map.
    pub fn from_bytes_with_styles(data: &'a [u8], styles: &'a StyleMap) -> Result<Self> {
        check_zip_header(data)?;
        let archive = ZipArchive::new(Cursor::new(data))?;
        Ok(Self { archive, styles })
    }

    /// Parse the document body.
    pub fn parse(mut self) -> Result<RichDocument> {
        let style_names = match self.read_part(STYLES_PART)? {
            Some(xml) => parse_style_names(&xml)?,
            None => {
                log::warn!("{} missing; paragraph styles resolve by id", STYLES_PART);
                HashMap::new()
            }
        };

        let body = self
            .read_part(DOCUMENT_PART)?
            .ok_or_else(|| Error::corrupt(format!("{} not found in container", DOCUMENT_PART)))?;

        let doc = walk_body(&body, &style_names, self.styles)?;
        log::debug!("Parsed DOCX body into {} blocks", doc.blocks.len());
        Ok(doc)
    }

    /// Read a part of the container as UTF-8, `None` if it does not exist.
    fn read_part(&mut self, name: &str) -> Result<Option<String>> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut xml = String::new();
        file.read_to_string(&mut xml)
            .map_err(|e| Error::corrupt(format!("{}: {}", name, e)))?;
        Ok(Some(xml))
    }
}

/// Extract an attribute value by key from an element.
fn get_attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

/// Toggle properties like `<w:b/>` are on unless `w:val` says otherwise.
fn toggle_is_on(e: &BytesStart) -> bool {
    !matches!(
        get_attr(e, b"w:val").as_deref(),
        Some("0") | Some("false") | Some("off")
    )
}

/// Word stores built-in style names in lowercase ("heading 1") but shows
/// them capitalized; style maps are written against the displayed name.
fn display_style_name(raw: &str) -> String {
    let is_builtin_heading = raw
        .strip_prefix("heading ")
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()));
    if is_builtin_heading || raw == "title" || raw == "subtitle" {
        let mut chars = raw.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    } else {
        raw.to_string()
    }
}

/// Parse `word/styles.xml` into a style id → display name table.
fn parse_style_names(xml: &str) -> Result<HashMap<String, String>> {
    let mut names = HashMap::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut current_id: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"w:style" => {
                current_id = get_attr(&e, b"w:styleId");
            }
            Event::Empty(e) if e.name().as_ref() == b"w:name" => {
                if let (Some(id), Some(name)) = (current_id.as_ref(), get_attr(&e, b"w:val")) {
                    names.insert(id.clone(), display_style_name(&name));
                }
            }
            Event::End(e) if e.name().as_ref() == b"w:style" => {
                current_id = None;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(names)
}

#[derive(Debug, Default)]
struct ParagraphState {
    style_id: Option<String>,
    runs: Vec<Run>,
}

#[derive(Debug, Default)]
struct RunState {
    bold: bool,
    italic: bool,
    text: String,
}

/// Mutable state carried through one walk over `word/document.xml`.
struct BodyWalk<'a> {
    style_names: &'a HashMap<String, String>,
    styles: &'a StyleMap,
    blocks: Vec<Block>,
    // Stacks: text boxes nest paragraphs inside runs
    paragraphs: Vec<ParagraphState>,
    runs: Vec<RunState>,
    in_run_props: bool,
    in_text: bool,
    // Depth inside mc:Fallback, whose content duplicates mc:Choice
    fallback_depth: usize,
}

impl<'a> BodyWalk<'a> {
    fn new(style_names: &'a HashMap<String, String>, styles: &'a StyleMap) -> Self {
        Self {
            style_names,
            styles,
            blocks: Vec::new(),
            paragraphs: Vec::new(),
            runs: Vec::new(),
            in_run_props: false,
            in_text: false,
            fallback_depth: 0,
        }
    }

    fn handle_start(&mut self, e: &BytesStart) {
        if e.name().as_ref() == b"mc:Fallback" {
            self.fallback_depth += 1;
            return;
        }
        if self.fallback_depth > 0 {
            return;
        }
        match e.name().as_ref() {
            b"w:p" => self.paragraphs.push(ParagraphState::default()),
            b"w:r" => self.runs.push(RunState::default()),
            b"w:rPr" if !self.runs.is_empty() => self.in_run_props = true,
            b"w:t" if !self.runs.is_empty() => self.in_text = true,
            _ => self.handle_property(e),
        }
    }

    fn handle_empty(&mut self, e: &BytesStart) {
        if self.fallback_depth > 0 {
            return;
        }
        match e.name().as_ref() {
            b"w:p" => {
                // Self-closing paragraph: nothing inside, same as an empty one
                self.paragraphs.push(ParagraphState::default());
                self.finish_paragraph();
            }
            b"w:tab" => {
                if let Some(run) = self.runs.last_mut() {
                    run.text.push('\t');
                }
            }
            b"w:br" | b"w:cr" => {
                if let Some(run) = self.runs.last_mut() {
                    run.text.push('\n');
                }
            }
            _ => self.handle_property(e),
        }
    }

    /// Paragraph style and run toggles, which may appear as empty or
    /// start elements.
    fn handle_property(&mut self, e: &BytesStart) {
        match e.name().as_ref() {
            b"w:pStyle" => {
                if let Some(p) = self.paragraphs.last_mut() {
                    p.style_id = get_attr(e, b"w:val");
                }
            }
            b"w:b" if self.in_run_props => {
                if let Some(run) = self.runs.last_mut() {
                    run.bold = toggle_is_on(e);
                }
            }
            b"w:i" if self.in_run_props => {
                if let Some(run) = self.runs.last_mut() {
                    run.italic = toggle_is_on(e);
                }
            }
            _ => {}
        }
    }

    fn handle_text(&mut self, text: &str) {
        if self.fallback_depth > 0 || !self.in_text {
            return;
        }
        if let Some(run) = self.runs.last_mut() {
            run.text.push_str(text);
        }
    }

    fn handle_end(&mut self, name: &[u8]) {
        if name == b"mc:Fallback" {
            self.fallback_depth = self.fallback_depth.saturating_sub(1);
            return;
        }
        if self.fallback_depth > 0 {
            return;
        }
        match name {
            b"w:t" => self.in_text = false,
            b"w:rPr" => self.in_run_props = false,
            b"w:r" => self.finish_run(),
            b"w:p" => self.finish_paragraph(),
            _ => {}
        }
    }

    fn marker_style(&self, key: &str) -> Option<RunStyle> {
        self.styles.get(key).map(RunStyle::from)
    }

    fn finish_run(&mut self) {
        self.in_run_props = false;
        self.in_text = false;
        let Some(state) = self.runs.pop() else {
            return;
        };
        if state.text.is_empty() {
            return;
        }

        let bold = if state.bold { self.marker_style(BOLD_KEY) } else { None };
        let italic = if state.italic { self.marker_style(ITALIC_KEY) } else { None };

        // Strong wraps emphasis: **\*text\***
        let run = match (bold, italic) {
            (Some(outer), Some(inner)) => {
                Run::wrapping(outer, vec![Run::new(inner, state.text)])
            }
            (Some(style), None) | (None, Some(style)) => Run::new(style, state.text),
            (None, None) => Run::plain(state.text),
        };

        if let Some(p) = self.paragraphs.last_mut() {
            p.runs.push(run);
        }
    }

    fn finish_paragraph(&mut self) {
        let Some(state) = self.paragraphs.pop() else {
            return;
        };

        let heading_level = state.style_id.as_deref().and_then(|id| {
            let name = self.style_names.get(id).map(String::as_str).unwrap_or(id);
            self.styles.heading_level(name)
        });

        let block = match heading_level {
            Some(level) => Block::Paragraph(vec![Run::wrapping(
                RunStyle::Heading(level),
                state.runs,
            )]),
            None if state.runs.iter().all(Run::is_empty) => Block::LineBreak,
            None => Block::Paragraph(state.runs),
        };
        self.blocks.push(block);
    }

    fn into_document(self) -> RichDocument {
        RichDocument {
            blocks: self.blocks,
        }
    }
}

/// Walk `word/document.xml` and build the block list.
fn walk_body(
    xml: &str,
    style_names: &HashMap<String, String>,
    styles: &StyleMap,
) -> Result<RichDocument> {
    let mut walk = BodyWalk::new(style_names, styles);

    let mut reader = Reader::from_str(xml);
    // xml:space="preserve" runs carry significant leading/trailing spaces
    reader.trim_text(false);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => walk.handle_start(&e),
            Event::Empty(e) => walk.handle_empty(&e),
            Event::Text(e) => {
                let text = e.unescape()?;
                walk.handle_text(&text);
            }
            Event::End(e) => walk.handle_end(e.name().as_ref()),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(walk.into_document())
}
