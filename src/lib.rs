//! # docviz
//!
//! Layout-aware content extraction from paginated documents.
//!
//! Each page is rendered, split into typed regions by a layout detector, and
//! every region is turned into text: straight from the document's native text
//! layer when it is good enough, through OCR otherwise, and through OCR plus a
//! language model for tables, figures and formulas.
//!
//! The heavy collaborators (rasterizer, detector, OCR engine, LLM client) are
//! plugged in through traits. The crate ships a `lopdf` source that counts
//! pages and reads the native text layer.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docviz::{Document, Extractor, ExtractionType};
//! # use docviz::layout::{DetectionBackend, RawDetection};
//! # use docviz::extract::OcrBackend;
//! # use docviz::source::Rasterizer;
//! # use docviz::config::DetectionConfig;
//! # use image::RgbImage;
//! # use std::path::Path;
//! # struct Yolo; struct Tesseract; struct Poppler;
//! # impl DetectionBackend for Yolo {
//! #     fn detect(
//! #         &mut self,
//! #         _: &RgbImage,
//! #         _: &DetectionConfig,
//! #     ) -> docviz::Result<Vec<RawDetection>> {
//! #         Ok(vec![])
//! #     }
//! # }
//! # impl OcrBackend for Tesseract {
//! #     fn recognize(&mut self, _: &RgbImage, _: &str) -> docviz::Result<String> {
//! #         Ok(String::new())
//! #     }
//! # }
//! # impl Rasterizer for Poppler {
//! #     fn rasterize(&self, _: &Path, _: u32, _: f32, _: f32) -> docviz::Result<RgbImage> {
//! #         Ok(RgbImage::new(1, 1))
//! #     }
//! # }
//!
//! fn main() -> docviz::Result<()> {
//!     let extractor = Extractor::builder()
//!         .with_rasterizer(Poppler)
//!         .with_detector(Yolo)
//!         .with_ocr(Tesseract)
//!         .with_includes([ExtractionType::Table, ExtractionType::Text])
//!         .build()?;
//!
//!     let result = extractor.extract(&Document::open("paper.pdf")?)?;
//!     println!("{}", docviz::render::to_markdown(&result));
//!
//!     for chunk in extractor.extract_streaming(&Document::new("book.pdf"), 10)? {
//!         let (start, end) = (chunk.start_page, chunk.end_page);
//!         println!("pages {}-{}: {} entries", start, end, chunk.result.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Native text first**: text-like regions skip OCR when the PDF has text
//! - **Streaming**: fixed-size page windows, computed on demand
//! - **Batch**: many documents, one failing document never stops the rest
//! - **Worker pool**: optional rayon pool for page-level parallelism
//! - **Async**: `async` feature adds suspension-based entry points

pub mod config;
pub mod environment;
pub mod error;
pub mod extract;
pub mod layout;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod source;

// Re-export commonly used types
pub use config::{
    ConfigResolver, DetectionBackendKind, DetectionConfig, Device, ExtractionConfig, LlmConfig,
    OcrConfig, ResolvedConfig,
};
pub use error::{Error, ErrorDescriptor, ErrorKind, Result};
pub use extract::{ContentExtractor, LlmBackend, OcrBackend};
pub use layout::{DetectionBackend, RegionDetector};
pub use model::{
    BoundingBox, CanonicalLabel, Document, ExtractionChunk, ExtractionEntry, ExtractionResult,
    ExtractionStats, ExtractionType, Provenance, Region, Warning,
};
pub use pipeline::{ExtractionStream, Pipeline};
pub use render::{JsonFormat, SaveFormat};
pub use source::{LopdfBackend, PageSource, Rasterizer, SourceBackend};

use std::ops::RangeInclusive;
use std::sync::Arc;

use extract::CleanupOptions;
use pipeline::Progress;

/// Check the layout model once per process.
///
/// Returns `Ok(true)` when this call performed the check, `Ok(false)` when an
/// earlier call already succeeded.
pub fn init(config: &DetectionConfig) -> Result<bool> {
    environment::initialize(|| environment::check_dependencies(config))
}

/// Caller-facing extraction entry point.
///
/// Single-document, streaming and batch extraction all go through the same
/// [`Pipeline`] and [`ConfigResolver`]; they only differ in how pages are
/// partitioned and aggregated.
#[derive(Clone)]
pub struct Extractor {
    pipeline: Pipeline,
    resolver: ConfigResolver,
}

impl Extractor {
    /// Start building an extractor.
    pub fn builder() -> ExtractorBuilder {
        ExtractorBuilder::new()
    }

    /// Wrap an already assembled pipeline.
    pub fn from_pipeline(pipeline: Pipeline, resolver: ConfigResolver) -> Self {
        Self { pipeline, resolver }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    /// Configuration used for `document`.
    pub fn config_for(&self, document: &Document) -> ResolvedConfig {
        self.resolver.resolve_for(document)
    }

    /// Extract every page of `document`.
    pub fn extract(&self, document: &Document) -> Result<ExtractionResult> {
        let config = self.config_for(document);
        self.pipeline.run(document, &config, None, None)
    }

    /// Extract `document`, reporting the number of completed pages.
    pub fn extract_with_progress(
        &self,
        document: &Document,
        progress: &mut dyn FnMut(u32),
    ) -> Result<ExtractionResult> {
        let config = self.config_for(document);
        self.pipeline.run(document, &config, None, Some(progress))
    }

    /// Extract a page range (1-indexed, inclusive) of `document`.
    pub fn extract_pages(
        &self,
        document: &Document,
        pages: RangeInclusive<u32>,
    ) -> Result<ExtractionResult> {
        let config = self.config_for(document);
        self.pipeline.run(document, &config, Some(pages), None)
    }

    /// Suspension-based variant of [`extract`](Self::extract).
    #[cfg(feature = "async")]
    pub async fn extract_async(&self, document: &Document) -> Result<ExtractionResult> {
        let config = self.config_for(document);
        self.pipeline.run_async(document, &config, None).await
    }

    /// Extract `document` lazily in windows of `chunk_size` pages.
    pub fn extract_streaming(
        &self,
        document: &Document,
        chunk_size: u32,
    ) -> Result<ExtractionStream> {
        let config = self.config_for(document);
        self.pipeline.stream(document, chunk_size, &config)
    }

    /// Extract several documents in order.
    ///
    /// All documents share one configuration (per-document defaults are not
    /// consulted). Per-document failures are recorded on that document's
    /// result.
    pub fn extract_batch(
        &self,
        documents: &[Document],
        progress: Option<Progress<'_>>,
    ) -> Result<Vec<ExtractionResult>> {
        let config = self.resolver.resolve();
        self.pipeline.run_many(documents, &config, progress)
    }
}

/// Builder for [`Extractor`].
///
/// A source, a detector and an OCR engine are required; everything else has
/// defaults.
pub struct ExtractorBuilder {
    source: Option<Arc<dyn SourceBackend>>,
    detector: Option<Box<dyn DetectionBackend>>,
    ocr: Option<Box<dyn OcrBackend>>,
    llm: Option<Arc<dyn LlmBackend>>,
    cleanup: Option<CleanupOptions>,
    workers: usize,
    resolver: ConfigResolver,
}

impl ExtractorBuilder {
    pub fn new() -> Self {
        Self {
            source: None,
            detector: None,
            ocr: None,
            llm: None,
            cleanup: None,
            workers: 1,
            resolver: ConfigResolver::new(),
        }
    }

    /// Use a custom document source.
    pub fn with_source_backend(mut self, backend: impl SourceBackend + 'static) -> Self {
        self.source = Some(Arc::new(backend));
        self
    }

    /// Use the bundled PDF source with `rasterizer` for page images.
    pub fn with_rasterizer(mut self, rasterizer: impl Rasterizer + 'static) -> Self {
        self.source = Some(Arc::new(LopdfBackend::new(Arc::new(rasterizer))));
        self
    }

    pub fn with_detector(mut self, detector: impl DetectionBackend + 'static) -> Self {
        self.detector = Some(Box::new(detector));
        self
    }

    pub fn with_ocr(mut self, ocr: impl OcrBackend + 'static) -> Self {
        self.ocr = Some(Box::new(ocr));
        self
    }

    pub fn with_llm(mut self, llm: impl LlmBackend + 'static) -> Self {
        self.llm = Some(Arc::new(llm));
        self
    }

    /// Normalize recognized text (off by default).
    pub fn with_cleanup(mut self, options: CleanupOptions) -> Self {
        self.cleanup = Some(options);
        self
    }

    /// Process pages on up to `workers` threads.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Replace the whole configuration resolver.
    pub fn with_resolver(mut self, resolver: ConfigResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_extraction_config(mut self, config: ExtractionConfig) -> Self {
        self.resolver = self.resolver.with_extraction(config);
        self
    }

    pub fn with_detection_config(mut self, config: DetectionConfig) -> Self {
        self.resolver = self.resolver.with_detection(config);
        self
    }

    pub fn with_ocr_config(mut self, config: OcrConfig) -> Self {
        self.resolver = self.resolver.with_ocr(config);
        self
    }

    pub fn with_llm_config(mut self, config: LlmConfig) -> Self {
        self.resolver = self.resolver.with_llm(config);
        self
    }

    /// Output categories to keep.
    pub fn with_includes(mut self, includes: impl IntoIterator<Item = ExtractionType>) -> Self {
        self.resolver = self.resolver.with_includes(includes);
        self
    }

    /// Assemble the extractor.
    ///
    /// Fails with [`Error::InvalidConfig`] when a required collaborator is
    /// missing or the configuration does not validate.
    pub fn build(self) -> Result<Extractor> {
        let source = self
            .source
            .ok_or_else(|| Error::InvalidConfig("no source backend configured".to_string()))?;
        let detector = self
            .detector
            .ok_or_else(|| Error::InvalidConfig("no detection backend configured".to_string()))?;
        let ocr = self
            .ocr
            .ok_or_else(|| Error::InvalidConfig("no OCR backend configured".to_string()))?;
        self.resolver.resolve().validate()?;

        let mut extractor = ContentExtractor::from_boxed(ocr);
        if let Some(llm) = self.llm {
            extractor = extractor.with_llm(llm);
        }
        if let Some(cleanup) = self.cleanup {
            extractor = extractor.with_cleanup(cleanup);
        }

        let pipeline = Pipeline::new(
            source,
            Arc::new(RegionDetector::from_boxed(detector)),
            Arc::new(extractor),
        )
        .with_workers(self.workers);

        Ok(Extractor::from_pipeline(pipeline, self.resolver))
    }
}

impl Default for ExtractorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
