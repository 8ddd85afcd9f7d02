//! Processing of a single page.

use std::sync::Arc;

use crate::config::ResolvedConfig;
use crate::error::{Error, Result};
use crate::extract::{ContentExtractor, Target};
use crate::layout::RegionDetector;
use crate::model::{ExtractionEntry, Warning};
use crate::source::{PageSource, TextLayer};

/// What one page contributed.
#[derive(Debug, Clone, Default)]
pub struct PageOutcome {
    /// Page number (1-indexed)
    pub page: u32,
    /// Kept entries in reading order
    pub entries: Vec<ExtractionEntry>,
    /// Regions returned by the detector
    pub detected: u32,
    /// Regions skipped because their label is excluded
    pub excluded: u32,
    /// Regions whose extraction failed
    pub skipped: u32,
    /// Entries dropped by the `includes` filter
    pub filtered: u32,
    /// Recoverable problems on this page
    pub warnings: Vec<Warning>,
}

/// Runs detection and extraction on one page.
#[derive(Clone)]
pub struct PageProcessor {
    detector: Arc<RegionDetector>,
    extractor: Arc<ContentExtractor>,
}

impl PageProcessor {
    pub fn new(detector: Arc<RegionDetector>, extractor: Arc<ContentExtractor>) -> Self {
        Self {
            detector,
            extractor,
        }
    }

    /// Process `page` of `source`.
    ///
    /// Render and detection failures are returned as errors; a missing text
    /// layer and failing regions are recorded on the outcome instead.
    pub fn process(
        &self,
        page: u32,
        source: &dyn PageSource,
        config: &ResolvedConfig,
    ) -> Result<PageOutcome> {
        let extraction = &config.extraction;
        let rendered = source
            .render(page, extraction.zoom_x, extraction.zoom_y)
            .map_err(|e| match e {
                e @ (Error::PageRender { .. } | Error::PageOutOfRange(..)) => e,
                other => Error::PageRender {
                    page,
                    reason: other.to_string(),
                },
            })?;

        let mut outcome = PageOutcome {
            page,
            ..Default::default()
        };

        let text_layer = source.text_layer(page).unwrap_or_else(|e| {
            log::warn!("Page {}: text layer unavailable: {}", page, e);
            outcome.warnings.push(Warning::for_page(page, &e));
            TextLayer::default()
        });

        let regions = self.detector.detect(&rendered, &config.detection)?;
        outcome.detected = regions.len() as u32;

        let mut entries = Vec::with_capacity(regions.len());
        if regions.is_empty() && extraction.whole_page_fallback {
            log::debug!("Page {}: no regions detected, extracting whole page", page);
            match self.extractor.extract(Target::WholePage, &rendered, &text_layer, config) {
                Ok(entry) => entries.extend(entry),
                Err(e) => outcome.record_failure(page, e),
            }
        }

        for region in &regions {
            if config.is_excluded(region.label) {
                outcome.excluded += 1;
                continue;
            }
            match self.extractor.extract(Target::Region(region), &rendered, &text_layer, config) {
                Ok(entry) => entries.extend(entry),
                Err(e) => outcome.record_failure(page, e),
            }
        }

        let before = entries.len();
        entries.retain(|entry| config.includes(entry.kind));
        outcome.filtered = (before - entries.len()) as u32;
        outcome.entries = entries;

        Ok(outcome)
    }
}

impl PageOutcome {
    fn record_failure(&mut self, page: u32, err: Error) {
        let err = err.into_region_error(page);
        log::warn!("{}", err);
        self.skipped += 1;
        self.warnings.push(Warning::for_page(page, &err));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigResolver, DetectionConfig};
    use crate::extract::OcrBackend;
    use crate::layout::{DetectionBackend, RawDetection};
    use crate::model::{BoundingBox, ExtractionType};
    use crate::source::RenderedPage;
    use image::RgbImage;

    struct OnePage {
        text_layer_fails: bool,
    }

    impl PageSource for OnePage {
        fn page_count(&self) -> Result<u32> {
            Ok(1)
        }

        fn render(&self, page: u32, _zoom_x: f32, _zoom_y: f32) -> Result<RenderedPage> {
            if page != 1 {
                return Err(Error::PageOutOfRange(page, 1));
            }
            Ok(RenderedPage::new(page, RgbImage::new(400, 400)))
        }

        fn text_layer(&self, _page: u32) -> Result<TextLayer> {
            if self.text_layer_fails {
                return Err(Error::PdfParse("broken content stream".to_string()));
            }
            Ok(TextLayer::default())
        }
    }

    /// DocStructBench classes: 0 title, 2 abandon, 5 table, 1 plain text.
    struct FixedLayout(Vec<RawDetection>);

    impl DetectionBackend for FixedLayout {
        fn detect(
            &mut self,
            _image: &RgbImage,
            _config: &DetectionConfig,
        ) -> Result<Vec<RawDetection>> {
            Ok(self.0.clone())
        }
    }

    /// Fails on crops wider than 300 px.
    struct NarrowOcr;

    impl OcrBackend for NarrowOcr {
        fn recognize(&mut self, image: &RgbImage, _lang: &str) -> Result<String> {
            if image.width() > 300 {
                return Err(Error::Ocr("crop too wide".to_string()));
            }
            Ok(format!("{}x{}", image.width(), image.height()))
        }
    }

    fn processor(detections: Vec<RawDetection>) -> PageProcessor {
        PageProcessor::new(
            Arc::new(RegionDetector::new(FixedLayout(detections))),
            Arc::new(ContentExtractor::new(NarrowOcr)),
        )
    }

    fn layout() -> Vec<RawDetection> {
        vec![
            RawDetection::new(BoundingBox::new(0.0, 0.0, 200.0, 40.0), 0, 0.9),
            RawDetection::new(BoundingBox::new(0.0, 50.0, 200.0, 150.0), 5, 0.9),
            RawDetection::new(BoundingBox::new(0.0, 200.0, 400.0, 300.0), 1, 0.9),
            RawDetection::new(BoundingBox::new(0.0, 380.0, 100.0, 400.0), 2, 0.9),
        ]
    }

    #[test]
    fn test_process_counts_regions() {
        let source = OnePage { text_layer_fails: false };
        let outcome = processor(layout())
            .process(1, &source, &ResolvedConfig::default())
            .unwrap();

        assert_eq!(outcome.detected, 4);
        assert_eq!(outcome.excluded, 1);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.entries.len(), 2);
        assert_eq!(outcome.entries[0].content, "200x40");
        assert_eq!(outcome.entries[1].kind, ExtractionType::Table);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].page, Some(1));
    }

    #[test]
    fn test_process_filters_includes() {
        let source = OnePage { text_layer_fails: false };
        let config = ConfigResolver::new()
            .with_includes([ExtractionType::Table])
            .resolve();
        let outcome = processor(layout()).process(1, &source, &config).unwrap();

        assert_eq!(outcome.entries.len(), 1);
        assert_eq!(outcome.entries[0].kind, ExtractionType::Table);
        assert_eq!(outcome.filtered, 1);
    }

    #[test]
    fn test_missing_text_layer_is_a_warning() {
        let source = OnePage { text_layer_fails: true };
        let outcome = processor(Vec::new())
            .process(1, &source, &ResolvedConfig::default())
            .unwrap();

        // Whole-page fallback still runs, and the 400 px crop fails OCR.
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.warnings.len(), 2);
        assert_eq!(outcome.warnings[0].kind, crate::error::ErrorKind::SourceUnavailable);
        assert!(outcome.entries.is_empty());
    }

    #[test]
    fn test_render_failure_is_page_error() {
        let source = OnePage { text_layer_fails: false };
        let err = processor(layout())
            .process(2, &source, &ResolvedConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::PageOutOfRange(2, 1)));
    }
}
