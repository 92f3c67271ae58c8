//! Positioned text extraction from PDF pages.
//!
//! Walks a page's content stream, tracks the text matrix and the current
//! transformation matrix (CTM) through the positioning and graphics state
//! operators, and emits one [`PositionedFragment`] per show-text operation
//! at its page-space origin. Form XObjects invoked with `Do` are walked
//! in place.
//!
//! [`PositionedFragment`]: crate::model::PositionedFragment

use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};
use crate::model::PageFragments;

use super::backend::{ContentOp, PageId, PdfBackend, PdfValue, ResourceScope};

/// Negative `TJ` adjustment (thousandths of text space) treated as a word gap.
pub const TJ_SPACE_THRESHOLD: f64 = 200.0;

/// Nesting limit for form XObjects; deeper (or cyclic) `Do` calls are skipped.
pub const MAX_FORM_DEPTH: usize = 16;

/// Average glyph advance as a fraction of the font size. Glyph widths are
/// not read from font programs, so consecutive shows on one line are
/// spaced with this estimate to keep their left-to-right order.
const AVG_GLYPH_WIDTH: f64 = 0.5;

const DEFAULT_FONT_SIZE: f64 = 12.0;

/// Extracts positioned fragments from the pages of one document.
pub struct PdfPageExtractor<'a, B: PdfBackend + ?Sized> {
    backend: &'a B,
}

impl<'a, B: PdfBackend + ?Sized> PdfPageExtractor<'a, B> {
    /// Create an extractor over a backend.
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Page numbers in ascending order.
    pub fn page_numbers(&self) -> Vec<u32> {
        self.backend.pages().keys().copied().collect()
    }

    /// Extract every page, in ascending page order. The first failing page
    /// aborts the whole extraction.
    pub fn extract_all(&self) -> Result<Vec<PageFragments>> {
        let pages = self.backend.pages();
        let mut result = Vec::with_capacity(pages.len());
        for (&number, &page_id) in &pages {
            result.push(self.extract_page_id(number, page_id)?);
        }
        Ok(result)
    }

    /// Extract the fragments of one page (1-based).
    pub fn extract_page(&self, number: u32) -> Result<PageFragments> {
        let pages = self.backend.pages();
        let page_id = pages.get(&number).copied().ok_or_else(|| {
            Error::corrupt(format!("page {} out of range ({} pages)", number, pages.len()))
        })?;
        self.extract_page_id(number, page_id)
    }

    fn extract_page_id(&self, number: u32, page_id: PageId) -> Result<PageFragments> {
        let content = self
            .backend
            .page_content(page_id)
            .map_err(|e| page_error(number, e))?;
        let ops = self
            .backend
            .decode_content(&content)
            .map_err(|e| page_error(number, e))?;

        let scope = ResourceScope::Page(page_id);
        let mut walker = ContentWalker {
            backend: self.backend,
            scope,
            fonts: HashMap::new(),
            state: GraphicsState::default(),
            saved: Vec::new(),
            page: PageFragments::new(number),
        };
        walker.load_fonts(scope);
        walker.walk(&ops, 0).map_err(|e| page_error(number, e))?;

        log::debug!(
            "page {}: {} operations, {} fragments",
            number,
            ops.len(),
            walker.page.len()
        );
        Ok(walker.page)
    }
}

fn page_error(number: u32, err: Error) -> Error {
    match err {
        Error::CorruptInput(msg) => Error::CorruptInput(format!("page {}: {}", number, msg)),
        other => other,
    }
}

/// Affine matrix `[a b c d e f]`, applied to row vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::from([1.0, 0.0, 0.0, 1.0, 0.0, 0.0])
    }
}

impl From<[f64; 6]> for Matrix {
    fn from([a, b, c, d, e, f]: [f64; 6]) -> Self {
        Self { a, b, c, d, e, f }
    }
}

impl Matrix {
    /// Six numeric operands, as taken by `Tm` and `cm`.
    fn from_operands(op: &ContentOp) -> Option<Self> {
        let mut values = [0.0; 6];
        for (idx, value) in values.iter_mut().enumerate() {
            *value = op.number(idx)?;
        }
        Some(Self::from(values))
    }

    /// `[1 0 0 1 tx ty] x self`
    fn translated(&self, tx: f64, ty: f64) -> Self {
        Self {
            e: self.e + tx * self.a + ty * self.c,
            f: self.f + tx * self.b + ty * self.d,
            ..*self
        }
    }

    /// `self x other`
    fn then(&self, other: &Matrix) -> Self {
        Self {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn transform(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }
}

/// Text state carried across operators.
#[derive(Debug, Clone)]
struct TextState {
    in_text: bool,
    /// Current text matrix (Tm)
    matrix: Matrix,
    /// Start of the current line (Tlm)
    line_matrix: Matrix,
    /// Leading set by TL / TD
    leading: f64,
    font_name: Vec<u8>,
    font_size: f64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            in_text: false,
            matrix: Matrix::default(),
            line_matrix: Matrix::default(),
            leading: 0.0,
            font_name: Vec::new(),
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = self.line_matrix.translated(tx, ty);
        self.matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    /// Advance along the baseline by `units` of text space.
    fn advance(&mut self, units: f64) {
        self.matrix = self.matrix.translated(units, 0.0);
    }
}

/// State saved by `q` and restored by `Q`.
#[derive(Debug, Clone, Default)]
struct GraphicsState {
    ctm: Matrix,
    text: TextState,
}

struct ContentWalker<'a, B: PdfBackend + ?Sized> {
    backend: &'a B,
    /// Resources that names in the current stream resolve against
    scope: ResourceScope,
    /// Font encodings by scope, read once each
    fonts: HashMap<ResourceScope, BTreeMap<Vec<u8>, Option<B::Encoding<'a>>>>,
    state: GraphicsState,
    saved: Vec<GraphicsState>,
    page: PageFragments,
}

impl<'a, B: PdfBackend + ?Sized> ContentWalker<'a, B> {
    fn load_fonts(&mut self, scope: ResourceScope) {
        if self.fonts.contains_key(&scope) {
            return;
        }
        let table = match self.backend.fonts(scope) {
            Ok(fonts) => fonts
                .into_iter()
                .map(|font| {
                    log::trace!(
                        "page {}: font /{} = {}",
                        self.page.number,
                        String::from_utf8_lossy(&font.name),
                        font.base_font
                    );
                    (font.name, font.encoding)
                })
                .collect(),
            Err(e) => {
                log::warn!("page {}: cannot read font resources: {}", self.page.number, e);
                BTreeMap::new()
            }
        };
        self.fonts.insert(scope, table);
    }

    fn walk(&mut self, ops: &[ContentOp], depth: usize) -> Result<()> {
        for op in ops {
            self.apply(op, depth)?;
        }
        Ok(())
    }

    fn apply(&mut self, op: &ContentOp, depth: usize) -> Result<()> {
        let text = &mut self.state.text;
        match op.operator.as_str() {
            "q" => self.saved.push(self.state.clone()),
            "Q" => match self.saved.pop() {
                Some(state) => self.state = state,
                None => log::debug!("page {}: unbalanced Q", self.page.number),
            },
            "cm" => {
                if let Some(m) = Matrix::from_operands(op) {
                    self.state.ctm = m.then(&self.state.ctm);
                }
            }
            "Do" => {
                if let Some(PdfValue::Name(name)) = op.operands.first() {
                    self.invoke_form(name, depth)?;
                }
            }
            "BT" => {
                text.in_text = true;
                text.matrix = Matrix::default();
                text.line_matrix = Matrix::default();
            }
            "ET" => text.in_text = false,
            "Tf" => {
                if let Some(PdfValue::Name(name)) = op.operands.first() {
                    let declared = self.fonts.get(&self.scope);
                    if declared.is_some_and(|t| !t.is_empty() && !t.contains_key(name)) {
                        log::warn!(
                            "page {}: font /{} not declared in resources",
                            self.page.number,
                            String::from_utf8_lossy(name)
                        );
                    }
                    text.font_name = name.clone();
                }
                text.font_size = op.number(1).unwrap_or(DEFAULT_FONT_SIZE);
            }
            "TL" => {
                if let Some(leading) = op.number(0) {
                    text.leading = leading;
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = (op.number(0), op.number(1)) {
                    text.move_line(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (op.number(0), op.number(1)) {
                    text.leading = -ty;
                    text.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(op) {
                    text.matrix = m;
                    text.line_matrix = m;
                }
            }
            "T*" => text.next_line(),
            "Tj" => {
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    self.show_string(bytes);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(items)) = op.operands.first() {
                    self.show_array(items);
                }
            }
            "'" => {
                text.next_line();
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    self.show_string(bytes);
                }
            }
            "\"" => {
                text.next_line();
                if let Some(PdfValue::Str(bytes)) = op.operands.get(2) {
                    self.show_string(bytes);
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Walk a form XObject's content with its matrix composed onto the CTM.
    /// Graphics state changes inside the form do not leak out of it.
    fn invoke_form(&mut self, name: &[u8], depth: usize) -> Result<()> {
        if depth >= MAX_FORM_DEPTH {
            log::warn!(
                "page {}: form /{} nested deeper than {}; skipped",
                self.page.number,
                String::from_utf8_lossy(name),
                MAX_FORM_DEPTH
            );
            return Ok(());
        }
        let Some(form) = self.backend.form_xobject(self.scope, name)? else {
            log::trace!(
                "page {}: XObject /{} is not a form",
                self.page.number,
                String::from_utf8_lossy(name)
            );
            return Ok(());
        };
        let ops = self.backend.decode_content(&form.content)?;
        self.load_fonts(form.scope);

        let outer_state = self.state.clone();
        let outer_saved = std::mem::take(&mut self.saved);
        let outer_scope = std::mem::replace(&mut self.scope, form.scope);
        self.state.ctm = Matrix::from(form.matrix).then(&self.state.ctm);

        let result = self.walk(&ops, depth + 1);

        self.state = outer_state;
        self.saved = outer_saved;
        self.scope = outer_scope;
        result
    }

    fn decode(&self, bytes: &[u8]) -> String {
        let encoding = self
            .fonts
            .get(&self.scope)
            .and_then(|table| table.get(&self.state.text.font_name))
            .and_then(Option::as_ref);
        self.backend.decode_text(encoding, bytes)
    }

    fn show_string(&mut self, bytes: &[u8]) {
        let text = self.decode(bytes);
        self.emit(text, 0.0);
    }

    /// A `TJ` array becomes one fragment; large negative adjustments
    /// between strings become word spaces.
    fn show_array(&mut self, items: &[PdfValue]) {
        let mut combined = String::new();
        let mut adjustment = 0.0;
        for item in items {
            match item {
                PdfValue::Str(bytes) => combined.push_str(&self.decode(bytes)),
                other => {
                    let Some(n) = other.as_number() else { continue };
                    adjustment += n;
                    if -n > TJ_SPACE_THRESHOLD && needs_word_space(&combined) {
                        combined.push(' ');
                    }
                }
            }
        }
        self.emit(combined, adjustment);
    }

    /// Record a fragment at the page-space origin of `Tm x CTM` and move
    /// past it.
    fn emit(&mut self, text: String, adjustment: f64) {
        let state = &mut self.state;
        if !state.text.in_text {
            return;
        }
        let (x, y) = state.ctm.transform(state.text.matrix.e, state.text.matrix.f);
        let size = state.text.font_size;
        let advance = text.chars().count() as f64 * size * AVG_GLYPH_WIDTH
            - adjustment / 1000.0 * size;
        self.page.push(text, x, y);
        state.text.advance(advance);
    }
}

fn needs_word_space(text: &str) -> bool {
    match text.chars().last() {
        Some(c) => !c.is_whitespace() && !is_spaceless_script_char(c),
        None => false,
    }
}

/// Scripts written without spaces between words (Chinese, Japanese kana).
fn is_spaceless_script_char(c: char) -> bool {
    matches!(c as u32,
        0x4E00..=0x9FFF
        | 0x3400..=0x4DBF
        | 0x20000..=0x2EBEF
        | 0x3040..=0x309F
        | 0x30A0..=0x30FF
        | 0x3000..=0x303F)
}
