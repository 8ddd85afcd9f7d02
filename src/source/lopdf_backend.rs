//! PDF source backed by `lopdf`.
//!
//! `lopdf` answers the structural questions (page enumeration, page size,
//! content streams, font encodings). Pixels come from a caller-supplied
//! [`Rasterizer`] since rasterization needs a full rendering engine.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbImage;
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use super::text_layer::is_spaceless_script_char;
use super::{format, PageSource, RenderedPage, SourceBackend, TextLayer, TextSpan};
use crate::error::{Error, Result};

/// Letter size, used when a page has no readable MediaBox.
const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// TJ adjustments larger than this (thousandths of an em) read as word breaks.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Turns a page of a PDF file into pixels.
pub trait Rasterizer: Send + Sync {
    /// Rasterize 1-indexed `page` of the file at `path`.
    fn rasterize(&self, path: &Path, page: u32, zoom_x: f32, zoom_y: f32) -> Result<RgbImage>;
}

/// [`SourceBackend`] reading PDF files with `lopdf`.
#[derive(Clone)]
pub struct LopdfBackend {
    rasterizer: Arc<dyn Rasterizer>,
}

impl LopdfBackend {
    pub fn new(rasterizer: Arc<dyn Rasterizer>) -> Self {
        Self { rasterizer }
    }

    /// Open a PDF file directly.
    pub fn load(&self, path: &Path) -> Result<LopdfSource> {
        let version = format::sniff_pdf_version(path)?;
        let doc = LopdfDocument::load(path)?;
        let pages = doc.get_pages();
        log::debug!(
            "Opened {} (PDF {}, {} pages)",
            path.display(),
            version,
            pages.len()
        );
        Ok(LopdfSource {
            path: path.to_path_buf(),
            doc,
            pages,
            rasterizer: Arc::clone(&self.rasterizer),
        })
    }
}

impl SourceBackend for LopdfBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn PageSource>> {
        Ok(Box::new(self.load(path)?))
    }
}

/// An opened PDF file.
pub struct LopdfSource {
    path: PathBuf,
    doc: LopdfDocument,
    pages: BTreeMap<u32, ObjectId>,
    rasterizer: Arc<dyn Rasterizer>,
}

impl LopdfSource {
    fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.pages
            .get(&page)
            .copied()
            .ok_or(Error::PageOutOfRange(page, self.pages.len() as u32))
    }

    /// Page size in points (MediaBox width and height).
    pub fn page_size(&self, page: u32) -> Result<(f32, f32)> {
        let page_id = self.page_id(page)?;
        let size = self
            .doc
            .get_dictionary(page_id)
            .ok()
            .and_then(|dict| dict.get(b"MediaBox").ok())
            .and_then(|mb| mb.as_array().ok())
            .filter(|arr| arr.len() >= 4)
            .map(|arr| {
                let x0 = arr[0].as_float().unwrap_or(0.0);
                let y0 = arr[1].as_float().unwrap_or(0.0);
                let x1 = arr[2].as_float().unwrap_or(DEFAULT_PAGE_SIZE.0);
                let y1 = arr[3].as_float().unwrap_or(DEFAULT_PAGE_SIZE.1);
                ((x1 - x0).abs(), (y1 - y0).abs())
            })
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Ok(size)
    }

    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            // A page without a content stream is blank.
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                Ok(Object::Stream(s)) => Ok(stream_bytes(s)),
                _ => Err(Error::PdfParse("Invalid content stream".to_string())),
            },
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Reference(r) = obj {
                        if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                            content.extend_from_slice(&stream_bytes(s));
                            content.push(b' ');
                        }
                    }
                }
                Ok(content)
            }
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn page_spans(&self, page_id: ObjectId, page_height: f32) -> Result<Vec<TextSpan>> {
        let fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;
        let data = self.page_content(page_id)?;
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let content =
            lopdf::content::Content::decode(&data).map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut parser = SpanParser::new(&self.doc, &fonts, page_height);
        for op in &content.operations {
            parser.apply(&op.operator, &op.operands);
        }
        Ok(parser.spans)
    }
}

impl PageSource for LopdfSource {
    fn page_count(&self) -> Result<u32> {
        Ok(self.pages.len() as u32)
    }

    fn render(&self, page: u32, zoom_x: f32, zoom_y: f32) -> Result<RenderedPage> {
        self.page_id(page)?;
        let image = self
            .rasterizer
            .rasterize(&self.path, page, zoom_x, zoom_y)
            .map_err(|e| match e {
                e @ Error::PageRender { .. } => e,
                other => Error::PageRender {
                    page,
                    reason: other.to_string(),
                },
            })?;
        Ok(RenderedPage::new(page, image))
    }

    fn text_layer(&self, page: u32) -> Result<TextLayer> {
        let page_id = self.page_id(page)?;
        let (width, height) = self.page_size(page)?;
        let spans = self.page_spans(page_id, height)?;
        Ok(TextLayer::new(width, height, spans))
    }
}

/// Text-state machine over one content stream.
struct SpanParser<'a> {
    doc: &'a LopdfDocument,
    fonts: &'a BTreeMap<Vec<u8>, &'a Dictionary>,
    page_height: f32,
    font: Option<&'a Dictionary>,
    font_size: f32,
    leading: f32,
    matrix: TextMatrix,
    in_text: bool,
    spans: Vec<TextSpan>,
}

impl<'a> SpanParser<'a> {
    fn new(
        doc: &'a LopdfDocument,
        fonts: &'a BTreeMap<Vec<u8>, &'a Dictionary>,
        page_height: f32,
    ) -> Self {
        Self {
            doc,
            fonts,
            page_height,
            font: None,
            font_size: 12.0,
            leading: 12.0,
            matrix: TextMatrix::default(),
            in_text: false,
            spans: Vec::new(),
        }
    }

    fn apply(&mut self, operator: &str, operands: &[Object]) {
        match operator {
            "BT" => {
                self.in_text = true;
                self.matrix = TextMatrix::default();
            }
            "ET" => self.in_text = false,
            "Tf" if operands.len() >= 2 => {
                if let Object::Name(name) = &operands[0] {
                    self.font = self.fonts.get(name.as_slice()).copied();
                }
                self.font_size = get_number(&operands[1]).unwrap_or(12.0);
            }
            "TL" => {
                if let Some(leading) = operands.first().and_then(get_number) {
                    self.leading = leading;
                }
            }
            "Td" | "TD" if operands.len() >= 2 => {
                let tx = get_number(&operands[0]).unwrap_or(0.0);
                let ty = get_number(&operands[1]).unwrap_or(0.0);
                if operator == "TD" {
                    self.leading = -ty;
                }
                self.matrix.translate(tx, ty);
            }
            "Tm" if operands.len() >= 6 => {
                let n = |i: usize, default: f32| get_number(&operands[i]).unwrap_or(default);
                self.matrix
                    .set(n(0, 1.0), n(1, 0.0), n(2, 0.0), n(3, 1.0), n(4, 0.0), n(5, 0.0));
            }
            "T*" => self.matrix.next_line(self.leading),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    let text = self.decode(bytes);
                    self.push_span(text);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    let text = self.decode_array(items);
                    self.push_span(text);
                }
            }
            "'" | "\"" => {
                self.matrix.next_line(self.leading);
                let index = if operator == "\"" { 2 } else { 0 };
                if let Some(Object::String(bytes, _)) = operands.get(index) {
                    let text = self.decode(bytes);
                    self.push_span(text);
                }
            }
            _ => {}
        }
    }

    fn decode(&self, bytes: &[u8]) -> String {
        self.font
            .and_then(|font| font.get_font_encoding(self.doc).ok())
            .and_then(|enc| LopdfDocument::decode_text(&enc, bytes).ok())
            .unwrap_or_else(|| decode_text_simple(bytes))
    }

    /// Decode a TJ array; large negative adjustments become spaces.
    fn decode_array(&self, items: &[Object]) -> String {
        let mut combined = String::new();
        for item in items {
            match item {
                Object::String(bytes, _) => combined.push_str(&self.decode(bytes)),
                other => {
                    let Some(adjustment) = get_number(other).map(|n| -n) else {
                        continue;
                    };
                    let ends_in_word = combined
                        .chars()
                        .last()
                        .is_some_and(|c| !c.is_whitespace() && !is_spaceless_script_char(c));
                    if adjustment > TJ_SPACE_THRESHOLD && ends_in_word {
                        combined.push(' ');
                    }
                }
            }
        }
        combined
    }

    fn push_span(&mut self, text: String) {
        if !self.in_text || text.trim().is_empty() {
            return;
        }
        let (x, y) = self.matrix.position();
        let size = self.font_size * self.matrix.scale();
        // No glyph metrics: assume an average advance of half an em.
        let width = text.chars().count() as f32 * size * 0.5;
        self.spans
            .push(TextSpan::new(text, x, self.page_height - y, width, size));
    }
}

/// Text matrix for tracking position in a content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        *self = Self { a, b, c, d, e, f };
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self, leading: f32) {
        self.translate(0.0, -leading);
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

/// Content bytes of a stream, decoded when it carries a `/Filter`.
fn stream_bytes(stream: &Stream) -> Vec<u8> {
    if stream.dict.has(b"Filter") {
        stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone())
    } else {
        stream.content.clone()
    }
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Decoding fallback when the font has no usable encoding.
fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::dictionary;

    struct BlankRasterizer;

    impl Rasterizer for BlankRasterizer {
        fn rasterize(
            &self,
            _path: &Path,
            _page: u32,
            zoom_x: f32,
            zoom_y: f32,
        ) -> Result<RgbImage> {
            Ok(RgbImage::new((612.0 * zoom_x) as u32, (792.0 * zoom_y) as u32))
        }
    }

    /// Write a PDF with one line of Helvetica text per page.
    fn write_pdf(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut doc = LopdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for line in lines {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*line)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        doc.save_to(&mut file).unwrap();
        file
    }

    fn backend() -> LopdfBackend {
        LopdfBackend::new(Arc::new(BlankRasterizer))
    }

    #[test]
    fn test_page_count() {
        let file = write_pdf(&["one", "two", "three"]);
        let source = backend().open(file.path()).unwrap();
        assert_eq!(source.page_count().unwrap(), 3);
    }

    #[test]
    fn test_text_layer_positions() {
        let file = write_pdf(&["Hello World"]);
        let source = backend().load(file.path()).unwrap();
        let layer = source.text_layer(1).unwrap();

        assert_eq!(layer.height, 792.0);
        assert_eq!(layer.spans.len(), 1);
        let span = &layer.spans[0];
        assert_eq!(span.text, "Hello World");
        assert_eq!(span.x, 72.0);
        assert_eq!(span.baseline, 92.0);
        assert_eq!(layer.full_text(), "Hello World");
    }

    #[test]
    fn test_text_layer_from_contents_array() {
        let file = write_pdf(&["Left"]);
        let mut doc = LopdfDocument::load(file.path()).unwrap();
        let page_id = *doc.get_pages().get(&1).unwrap();
        let first = doc
            .get_dictionary(page_id)
            .unwrap()
            .get(b"Contents")
            .unwrap()
            .clone();
        let second = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![300.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal("Right")]),
                Operation::new("ET", vec![]),
            ],
        };
        let second_id = doc.add_object(Stream::new(dictionary! {}, second.encode().unwrap()));
        doc.get_dictionary_mut(page_id)
            .unwrap()
            .set("Contents", vec![first, second_id.into()]);
        let mut out = tempfile::NamedTempFile::new().unwrap();
        doc.save_to(&mut out).unwrap();

        let source = backend().load(out.path()).unwrap();
        let layer = source.text_layer(1).unwrap();
        let texts: Vec<&str> = layer.spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Left", "Right"]);
    }

    #[test]
    fn test_stream_bytes_without_filter() {
        let stream = Stream::new(dictionary! {}, b"BT ET".to_vec());
        assert_eq!(stream_bytes(&stream), b"BT ET".to_vec());
    }

    #[test]
    fn test_out_of_range_page() {
        let file = write_pdf(&["only"]);
        let source = backend().load(file.path()).unwrap();
        assert!(matches!(source.render(2, 1.0, 1.0), Err(Error::PageOutOfRange(2, 1))));
        assert!(matches!(source.text_layer(0), Err(Error::PageOutOfRange(0, 1))));
    }

    #[test]
    fn test_render_uses_rasterizer() {
        let file = write_pdf(&["only"]);
        let source = backend().load(file.path()).unwrap();
        let page = source.render(1, 2.0, 2.0).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.image.dimensions(), (1224, 1584));
    }

    #[test]
    fn test_not_a_pdf() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"plain text, not a pdf").unwrap();
        assert!(matches!(backend().open(file.path()), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_text_matrix() {
        let mut m = TextMatrix::default();
        m.set(2.0, 0.0, 0.0, 2.0, 10.0, 20.0);
        m.translate(5.0, 0.0);
        assert_eq!(m.position(), (20.0, 20.0));
        m.next_line(12.0);
        assert_eq!(m.position(), (20.0, -4.0));
        assert_eq!(m.scale(), 2.0);
    }

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
        assert_eq!(decode_text_simple(&[0x48, 0x65, 0x6C, 0x6C, 0xE9]), "Hellé");
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69]), "Hi");
    }
}
