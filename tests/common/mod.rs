//! Mock collaborators shared by the integration tests.
//!
//! Every page is a 400x400 image filled with one color whose red channel is
//! the page number, so crops remember which page they came from.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use docviz::config::DetectionConfig;
use docviz::extract::{LlmBackend, OcrBackend, StructureHint};
use docviz::layout::{DetectionBackend, RawDetection};
use docviz::model::BoundingBox;
use docviz::source::{PageSource, RenderedPage, SourceBackend, TextLayer, TextSpan};
use docviz::{ContentExtractor, Error, LlmConfig, Pipeline, RegionDetector, Result};
use image::{Rgb, RgbImage};

pub const PAGE_SIZE: u32 = 400;

/// DocStructBench class ids.
pub const TITLE: u32 = 0;
pub const PLAIN_TEXT: u32 = 1;
pub const ABANDON: u32 = 2;
pub const FIGURE: u32 = 3;
pub const TABLE: u32 = 5;

/// Documents of `pages` pages; paths containing "missing" fail to open.
pub struct MockBackend {
    pub pages: u32,
    pub failing_pages: Vec<u32>,
    pub fail_after: Option<usize>,
    pub opens: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn new(pages: u32) -> Self {
        Self {
            pages,
            failing_pages: Vec::new(),
            fail_after: None,
            opens: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_failing_pages(mut self, pages: impl IntoIterator<Item = u32>) -> Self {
        self.failing_pages = pages.into_iter().collect();
        self
    }

    /// Every open after the first `opens` fails.
    pub fn failing_after(mut self, opens: usize) -> Self {
        self.fail_after = Some(opens);
        self
    }
}

impl SourceBackend for MockBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn PageSource>> {
        let previous = self.opens.fetch_add(1, Ordering::SeqCst);
        let vanished = self.fail_after.is_some_and(|limit| previous >= limit);
        if vanished || path.to_string_lossy().contains("missing") {
            return Err(Error::SourceUnavailable {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            });
        }
        Ok(Box::new(MockSource {
            pages: self.pages,
            failing_pages: self.failing_pages.clone(),
        }))
    }
}

pub struct MockSource {
    pages: u32,
    failing_pages: Vec<u32>,
}

impl PageSource for MockSource {
    fn page_count(&self) -> Result<u32> {
        Ok(self.pages)
    }

    fn render(&self, page: u32, _zoom_x: f32, _zoom_y: f32) -> Result<RenderedPage> {
        if page == 0 || page > self.pages {
            return Err(Error::PageOutOfRange(page, self.pages));
        }
        if self.failing_pages.contains(&page) {
            return Err(Error::PageRender {
                page,
                reason: "rasterizer crashed".to_string(),
            });
        }
        let image = RgbImage::from_pixel(PAGE_SIZE, PAGE_SIZE, Rgb([page as u8, 0, 0]));
        Ok(RenderedPage::new(page, image))
    }

    /// Native text only inside the body paragraph (pixel rows 80..180 at zoom 2).
    fn text_layer(&self, page: u32) -> Result<TextLayer> {
        let half = PAGE_SIZE as f32 / 2.0;
        Ok(TextLayer::new(
            half,
            half,
            vec![TextSpan::new(
                native_text(page),
                12.0,
                60.0,
                170.0,
                10.0,
            )],
        ))
    }
}

pub fn native_text(page: u32) -> String {
    format!("Native paragraph text of page {page}")
}

/// The same layout on every page, in pixels of the rendered image.
pub fn standard_layout() -> Vec<RawDetection> {
    vec![
        detection(20.0, 20.0, 380.0, 60.0, TITLE),
        detection(20.0, 80.0, 380.0, 180.0, PLAIN_TEXT),
        detection(20.0, 200.0, 380.0, 300.0, TABLE),
        detection(20.0, 310.0, 380.0, 370.0, FIGURE),
        detection(20.0, 380.0, 380.0, 395.0, ABANDON),
    ]
}

pub fn detection(x1: f32, y1: f32, x2: f32, y2: f32, class_id: u32) -> RawDetection {
    RawDetection::new(BoundingBox::new(x1, y1, x2, y2), class_id, 0.9)
}

pub struct FixedDetector(pub Vec<RawDetection>);

impl DetectionBackend for FixedDetector {
    fn detect(
        &mut self,
        _image: &RgbImage,
        _config: &DetectionConfig,
    ) -> Result<Vec<RawDetection>> {
        Ok(self.0.clone())
    }
}

/// Reports the page and crop size it was given.
pub struct EchoOcr;

impl OcrBackend for EchoOcr {
    fn recognize(&mut self, image: &RgbImage, _lang: &str) -> Result<String> {
        let page = image.get_pixel(0, 0)[0];
        Ok(format!("ocr p{} {}x{}", page, image.width(), image.height()))
    }
}

/// Prefixes the structure hint.
#[derive(Default)]
pub struct TaggingLlm {
    pub calls: AtomicUsize,
}

impl LlmBackend for TaggingLlm {
    fn structure(&self, raw: &str, hint: StructureHint, _config: &LlmConfig) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("[{hint}] {raw}"))
    }
}

/// Fails every call, like an unreachable endpoint.
pub struct FailingLlm;

impl LlmBackend for FailingLlm {
    fn structure(&self, _raw: &str, _hint: StructureHint, _config: &LlmConfig) -> Result<String> {
        Err(Error::Llm("connection refused".to_string()))
    }
}

pub fn pipeline(backend: MockBackend) -> Pipeline {
    pipeline_with_layout(backend, standard_layout())
}

pub fn pipeline_with_layout(backend: MockBackend, layout: Vec<RawDetection>) -> Pipeline {
    Pipeline::new(
        Arc::new(backend),
        Arc::new(RegionDetector::new(FixedDetector(layout))),
        Arc::new(ContentExtractor::new(EchoOcr)),
    )
}

pub fn pipeline_with_llm(backend: MockBackend, llm: Arc<dyn LlmBackend>) -> Pipeline {
    Pipeline::new(
        Arc::new(backend),
        Arc::new(RegionDetector::new(FixedDetector(standard_layout()))),
        Arc::new(ContentExtractor::new(EchoOcr).with_llm(llm)),
    )
}

pub fn doc(name: &str) -> docviz::Document {
    docviz::Document::new(PathBuf::from(name))
}
