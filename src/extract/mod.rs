//! Per-region content extraction.
//!
//! [`ContentExtractor`] decides, for one region (or a whole page), whether the
//! native text layer can be used as-is or whether the pixels must go through
//! OCR, optionally followed by LLM structuring, and returns a typed entry.

mod backends;
pub mod cleanup;

pub use backends::{LlmBackend, OcrBackend, StructureHint};
pub use cleanup::{clean, CleanupOptions};

use std::sync::{Arc, Mutex};

use crate::config::ResolvedConfig;
use crate::error::{Error, Result};
use crate::model::{BoundingBox, CanonicalLabel, ExtractionEntry, Provenance, Region};
use crate::source::{RenderedPage, TextLayer};

/// What to extract.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// One detected region
    Region(&'a Region),
    /// The whole page, treated as one text region
    WholePage,
}

impl Target<'_> {
    fn label(&self) -> CanonicalLabel {
        match self {
            Target::Region(region) => region.label,
            Target::WholePage => CanonicalLabel::Text,
        }
    }

    fn bbox(&self, page: &RenderedPage) -> BoundingBox {
        match self {
            Target::Region(region) => region.bbox,
            Target::WholePage => page.bounds(),
        }
    }

    fn region(&self) -> Option<Region> {
        match self {
            Target::Region(region) => Some((*region).clone()),
            Target::WholePage => None,
        }
    }
}

/// How a target is turned into content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Use the native text verbatim
    NativeText(String),
    /// OCR the crop, then ask the LLM for the given structure
    OcrThenLlm(StructureHint),
    /// OCR the crop
    Ocr,
}

impl Strategy {
    /// Pick the strategy for `label`, in precedence order: usable native
    /// text, then chart labels, then plain OCR.
    ///
    /// Native text is usable when its trimmed length reaches
    /// `pdf_text_threshold_chars`; it is carried over untouched.
    pub fn select(label: CanonicalLabel, native_text: &str, config: &ResolvedConfig) -> Self {
        if label.is_text_like()
            && config.extraction.prefer_pdf_text
            && native_text.trim().chars().count() >= config.extraction.pdf_text_threshold_chars
        {
            return Strategy::NativeText(native_text.to_string());
        }
        if config.is_chart(label) {
            return Strategy::OcrThenLlm(StructureHint::for_label(label));
        }
        Strategy::Ocr
    }
}

/// Long-lived extractor holding the OCR engine and the optional LLM client.
pub struct ContentExtractor {
    ocr: Mutex<Box<dyn OcrBackend>>,
    llm: Option<Arc<dyn LlmBackend>>,
    cleanup: CleanupOptions,
}

impl ContentExtractor {
    pub fn new(ocr: impl OcrBackend + 'static) -> Self {
        Self::from_boxed(Box::new(ocr))
    }

    pub fn from_boxed(ocr: Box<dyn OcrBackend>) -> Self {
        Self {
            ocr: Mutex::new(ocr),
            llm: None,
            cleanup: CleanupOptions::none(),
        }
    }

    /// Attach the LLM used for chart labels. Without one, chart labels keep
    /// their raw OCR text.
    pub fn with_llm(mut self, llm: Arc<dyn LlmBackend>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Normalize recognized text before it becomes an entry.
    ///
    /// Off by default: OCR and LLM output is used as returned. Code, formula
    /// and table content, as well as LLM output, only get the
    /// layout-preserving subset of `options`.
    pub fn with_cleanup(mut self, options: CleanupOptions) -> Self {
        self.cleanup = options;
        self
    }

    /// Extract one target.
    ///
    /// Returns `Ok(None)` when the label is excluded or nothing usable was
    /// recognized. OCR, LLM and crop failures come back as
    /// [`Error::RegionExtraction`].
    pub fn extract(
        &self,
        target: Target<'_>,
        page: &RenderedPage,
        text_layer: &TextLayer,
        config: &ResolvedConfig,
    ) -> Result<Option<ExtractionEntry>> {
        let label = target.label();
        if config.is_excluded(label) {
            return Ok(None);
        }

        let bbox = target.bbox(page);
        let native = if label.is_text_like() && config.extraction.prefer_pdf_text {
            text_layer.text_within(&bbox, config.extraction.zoom_x, config.extraction.zoom_y)
        } else {
            String::new()
        };

        let strategy = Strategy::select(label, &native, config);
        log::trace!("Page {} {}: {:?}", page.page, label, strategy);

        let page_no = page.page;
        let (content, provenance) = match strategy {
            Strategy::NativeText(text) => {
                if text.trim().is_empty() {
                    return Ok(None);
                }
                return Ok(Some(ExtractionEntry::native_text(page_no, label, text)));
            }
            Strategy::OcrThenLlm(hint) => {
                let raw = self.recognize(page, &bbox, config)?;
                match &self.llm {
                    Some(llm) if !raw.trim().is_empty() => {
                        let structured = llm
                            .structure(&raw, hint, &config.llm)
                            .map_err(|e| e.into_region_error(page_no))?;
                        let options = self.cleanup.layout_preserving();
                        (clean(&structured, &options), Provenance::Llm)
                    }
                    _ => (clean(&raw, &self.cleanup_for(label)), Provenance::Ocr),
                }
            }
            Strategy::Ocr => {
                let raw = self.recognize(page, &bbox, config)?;
                (clean(&raw, &self.cleanup_for(label)), Provenance::Ocr)
            }
        };

        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(ExtractionEntry::recognized(
            page_no,
            label,
            content,
            target.region(),
            provenance,
        )))
    }

    fn recognize(
        &self,
        page: &RenderedPage,
        bbox: &BoundingBox,
        config: &ResolvedConfig,
    ) -> Result<String> {
        let crop = page.crop(bbox)?;
        let mut ocr = self.ocr.lock().map_err(|_| Error::RegionExtraction {
            page: page.page,
            reason: "OCR engine lock poisoned".to_string(),
        })?;
        ocr.recognize(&crop, &config.ocr.lang)
            .map_err(|e| e.into_region_error(page.page))
    }

    fn cleanup_for(&self, label: CanonicalLabel) -> CleanupOptions {
        match label {
            CanonicalLabel::Code | CanonicalLabel::Formula | CanonicalLabel::Table => {
                self.cleanup.layout_preserving()
            }
            _ => self.cleanup.clone(),
        }
    }
}
