//! Access to PDF pages, resources and content streams.
//!
//! [`PdfPageExtractor`](super::PdfPageExtractor) is written against the
//! [`PdfBackend`] trait; [`LopdfBackend`] is the production implementation.
//! Tests substitute a backend that serves scripted operations.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, Stream};

use crate::error::{Error, Result};

/// Object id: (object number, generation number).
pub type PageId = (u32, u16);

/// The object whose `/Resources` a content stream resolves names against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceScope {
    /// A page, including resources inherited from the page tree
    Page(PageId),
    /// A form XObject carrying its own `/Resources`
    Form(PageId),
}

/// A font resource, resolved once per scope.
#[derive(Debug, Clone)]
pub struct BackendFont<E> {
    /// Resource name used by `Tf` (e.g. `F1`)
    pub name: Vec<u8>,
    /// `BaseFont` of the font dictionary, `"Unknown"` when absent
    pub base_font: String,
    /// Text encoding, `None` when the font declares none we can read
    pub encoding: Option<E>,
}

/// A form XObject invoked by `Do`.
#[derive(Debug, Clone, PartialEq)]
pub struct FormXObject {
    /// Scope the form's content resolves names in
    pub scope: ResourceScope,
    /// Form space to user space, `[a b c d e f]`
    pub matrix: [f64; 6],
    /// Decompressed content stream
    pub content: Vec<u8>,
}

/// Identity matrix in `[a b c d e f]` form.
pub const IDENTITY: [f64; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Operand of a content stream operation.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    /// Operand kinds text extraction never reads
    Other,
}

impl PdfValue {
    /// Numeric value of an integer or real operand.
    pub fn as_number(&self) -> Option<f64> {
        match *self {
            PdfValue::Integer(i) => Some(i as f64),
            PdfValue::Real(r) => Some(f64::from(r)),
            _ => None,
        }
    }
}

impl From<&Object> for PdfValue {
    fn from(obj: &Object) -> Self {
        match obj {
            Object::Integer(i) => PdfValue::Integer(*i),
            Object::Real(r) => PdfValue::Real(*r),
            Object::Name(n) => PdfValue::Name(n.clone()),
            Object::String(bytes, _) => PdfValue::Str(bytes.clone()),
            Object::Array(items) => PdfValue::Array(items.iter().map(PdfValue::from).collect()),
            _ => PdfValue::Other,
        }
    }
}

/// Operator and operands of one content stream operation.
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    /// Numeric operand at `idx`.
    pub fn number(&self, idx: usize) -> Option<f64> {
        self.operands.get(idx).and_then(PdfValue::as_number)
    }
}

/// What the page extractor needs from a PDF library.
pub trait PdfBackend {
    /// Font encoding handle, borrowed from the backend.
    type Encoding<'a>
    where
        Self: 'a;

    /// Page number (1-based) to page object id, ascending.
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Fonts available in a scope, encodings resolved.
    fn fonts(&self, scope: ResourceScope) -> Result<Vec<BackendFont<Self::Encoding<'_>>>>;

    /// Decompressed content of a page, multiple streams concatenated.
    /// A page without `Contents` has empty content.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>>;

    /// The form XObject `name` refers to in `scope`. `None` for image
    /// XObjects and unknown names.
    fn form_xobject(&self, scope: ResourceScope, name: &[u8]) -> Result<Option<FormXObject>>;

    /// Tokenize content bytes into operations.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>>;

    /// Decode string operand bytes with a font's encoding, or with
    /// [`decode_text_simple`] when there is none.
    fn decode_text<'a>(&'a self, encoding: Option<&Self::Encoding<'a>>, bytes: &[u8]) -> String;
}

/// Decode string bytes without font information: UTF-16BE when the BOM is
/// present, else UTF-8, else Latin-1.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => match std::str::from_utf8(bytes) {
            Ok(text) => text.to_owned(),
            Err(_) => bytes.iter().copied().map(char::from).collect(),
        },
    }
}

/// [`PdfBackend`] over a parsed `lopdf::Document`.
pub struct LopdfBackend {
    doc: Document,
}

impl LopdfBackend {
    /// Parse a PDF held in memory. Encrypted documents are rejected.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(data).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::corrupt("PDF is encrypted"),
            other => Error::from(other),
        })?;
        if doc.is_encrypted() {
            return Err(Error::corrupt("PDF is encrypted"));
        }
        Ok(Self::from_document(doc))
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: Document) -> Self {
        Self { doc }
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// PDF version from the file header.
    pub fn version(&self) -> &str {
        &self.doc.version
    }

    /// Resource dictionaries of a scope, nearest first.
    fn resource_dicts(&self, scope: ResourceScope) -> Result<Vec<&Dictionary>> {
        match scope {
            ResourceScope::Page(id) => {
                let (own, inherited) = self.doc.get_page_resources(id)?;
                let mut dicts: Vec<&Dictionary> = own.into_iter().collect();
                for id in inherited {
                    dicts.push(self.doc.get_dictionary(id)?);
                }
                Ok(dicts)
            }
            ResourceScope::Form(id) => {
                let form = self.doc.get_object(id)?.as_stream()?;
                let resources = self.deref_dict(form.dict.get(b"Resources")?)?;
                Ok(vec![resources])
            }
        }
    }

    fn deref_dict<'a>(&'a self, obj: &'a Object) -> Result<&'a Dictionary> {
        let (_, obj) = self.doc.dereference(obj)?;
        Ok(obj.as_dict()?)
    }

    /// Entries of the `category` sub-dictionary (`Font`, `XObject`) across
    /// a scope's resources; nearer definitions win.
    fn resource_entries(
        &self,
        scope: ResourceScope,
        category: &[u8],
    ) -> Result<BTreeMap<Vec<u8>, &Object>> {
        let mut entries = BTreeMap::new();
        for resources in self.resource_dicts(scope)? {
            let Ok(dict) = self.doc.get_dict_in_dict(resources, category) else {
                continue;
            };
            for (name, value) in dict.iter() {
                entries.entry(name.clone()).or_insert(value);
            }
        }
        Ok(entries)
    }

    /// Bytes of one content stream, following a reference if needed.
    fn stream_bytes(&self, obj: &Object) -> Result<Vec<u8>> {
        let (_, obj) = self.doc.dereference(obj)?;
        let Object::Stream(stream) = obj else {
            return Err(Error::corrupt("page content is not a stream"));
        };
        decoded_stream(stream)
    }
}

fn decoded_stream(stream: &Stream) -> Result<Vec<u8>> {
    if stream.dict.has(b"Filter") {
        Ok(stream.decompressed_content()?)
    } else {
        Ok(stream.content.clone())
    }
}

fn form_matrix(dict: &Dictionary) -> [f64; 6] {
    let Ok(values) = dict.get(b"Matrix").and_then(Object::as_array) else {
        return IDENTITY;
    };
    let numbers: Vec<f64> = values
        .iter()
        .filter_map(|v| v.as_float().ok())
        .map(f64::from)
        .collect();
    match <[f64; 6]>::try_from(numbers) {
        Ok(matrix) => matrix,
        Err(_) => {
            log::warn!("malformed form /Matrix; using identity");
            IDENTITY
        }
    }
}

impl PdfBackend for LopdfBackend {
    type Encoding<'a> = lopdf::Encoding<'a> where Self: 'a;

    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn fonts(&self, scope: ResourceScope) -> Result<Vec<BackendFont<lopdf::Encoding<'_>>>> {
        let mut fonts = Vec::new();
        for (name, value) in self.resource_entries(scope, b"Font")? {
            let Ok(dict) = self.deref_dict(value) else {
                log::debug!("font /{} is not a dictionary", String::from_utf8_lossy(&name));
                continue;
            };
            let base_font = dict
                .get(b"BaseFont")
                .and_then(Object::as_name)
                .map(|n| String::from_utf8_lossy(n).into_owned())
                .unwrap_or_else(|_| "Unknown".to_string());
            let encoding = match dict.get_font_encoding(&self.doc) {
                Ok(encoding) => Some(encoding),
                Err(e) => {
                    log::debug!("font {}: no usable encoding: {}", base_font, e);
                    None
                }
            };
            fonts.push(BackendFont {
                name,
                base_font,
                encoding,
            });
        }
        Ok(fonts)
    }

    fn page_content(&self, page: PageId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page)?;
        let Ok(contents) = page_dict.get(b"Contents") else {
            log::debug!("page object {:?} has no Contents", page);
            return Ok(Vec::new());
        };

        match contents {
            Object::Array(parts) => {
                let mut content = Vec::new();
                for part in parts {
                    content.extend(self.stream_bytes(part)?);
                    // streams may end mid-token; keep operators apart
                    content.push(b'\n');
                }
                Ok(content)
            }
            single => self.stream_bytes(single),
        }
    }

    fn form_xobject(&self, scope: ResourceScope, name: &[u8]) -> Result<Option<FormXObject>> {
        let entries = self.resource_entries(scope, b"XObject")?;
        let Some(&Object::Reference(id)) = entries.get(name).copied() else {
            return Ok(None);
        };
        let stream = self.doc.get_object(id)?.as_stream()?;
        let is_form = matches!(
            stream.dict.get(b"Subtype").and_then(Object::as_name),
            Ok(b"Form")
        );
        if !is_form {
            return Ok(None);
        }

        let scope = if stream.dict.has(b"Resources") {
            ResourceScope::Form(id)
        } else {
            scope
        };
        Ok(Some(FormXObject {
            scope,
            matrix: form_matrix(&stream.dict),
            content: decoded_stream(stream)?,
        }))
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        let content = lopdf::content::Content::decode(data)?;
        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operands: op.operands.iter().map(PdfValue::from).collect(),
                operator: op.operator,
            })
            .collect())
    }

    fn decode_text<'a>(&'a self, encoding: Option<&lopdf::Encoding<'a>>, bytes: &[u8]) -> String {
        encoding
            .and_then(|enc| Document::decode_text(enc, bytes).ok())
            .unwrap_or_else(|| decode_text_simple(bytes))
    }
}
