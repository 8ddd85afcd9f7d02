//! Layout detection.
//!
//! A [`DetectionBackend`] wraps the vision model and returns raw detections.
//! [`RegionDetector`] owns the long-lived backend handle and turns raw
//! detections into canonical, reading-ordered [`Region`]s.

pub mod labels;

use std::sync::Mutex;

use image::RgbImage;

use crate::config::DetectionConfig;
use crate::error::{Error, Result};
use crate::model::{BoundingBox, Region};
use crate::source::RenderedPage;

/// Fraction of the page height treated as one row when ordering regions.
const ROW_BUCKET_FRACTION: f32 = 0.01;

/// One detection as returned by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    /// Box in rendered-image pixels
    pub bbox: BoundingBox,
    /// Model-specific class id
    pub class_id: u32,
    /// Detection score
    pub score: f32,
}

impl RawDetection {
    pub fn new(bbox: BoundingBox, class_id: u32, score: f32) -> Self {
        Self {
            bbox,
            class_id,
            score,
        }
    }
}

/// A layout detection model.
///
/// Backends are not assumed to be reentrant, hence `&mut self`.
pub trait DetectionBackend: Send {
    /// Detect regions on a rendered page.
    fn detect(&mut self, image: &RgbImage, config: &DetectionConfig) -> Result<Vec<RawDetection>>;
}

/// Long-lived detector shared by every page of every document.
pub struct RegionDetector {
    backend: Mutex<Box<dyn DetectionBackend>>,
}

impl RegionDetector {
    pub fn new(backend: impl DetectionBackend + 'static) -> Self {
        Self::from_boxed(Box::new(backend))
    }

    pub fn from_boxed(backend: Box<dyn DetectionBackend>) -> Self {
        Self {
            backend: Mutex::new(backend),
        }
    }

    /// Detect, filter, canonicalize and order the regions of a page.
    pub fn detect(&self, page: &RenderedPage, config: &DetectionConfig) -> Result<Vec<Region>> {
        let raw = {
            let mut backend = self
                .backend
                .lock()
                .map_err(|_| Error::Detection("detector lock poisoned".to_string()))?;
            backend.detect(&page.image, config)?
        };

        let (width, height) = (page.width() as f32, page.height() as f32);
        let mut regions: Vec<Region> = raw
            .into_iter()
            .filter(|d| d.score >= config.confidence)
            .filter_map(|d| {
                let bbox = d.bbox.clamp(width, height);
                if bbox.is_empty() {
                    return None;
                }
                let label = labels::canonical_label(config.backend, d.class_id);
                Some(Region::new(page.page, bbox, label, d.score))
            })
            .collect();

        sort_reading_order(&mut regions, height);
        log::debug!("Page {}: {} regions", page.page, regions.len());
        Ok(regions)
    }
}

/// Stable top-to-bottom, left-to-right ordering; assigns `Region::order`.
fn sort_reading_order(regions: &mut [Region], page_height: f32) {
    let bucket = (page_height * ROW_BUCKET_FRACTION).max(1.0);
    regions.sort_by(|a, b| {
        let row_a = (a.bbox.y1 / bucket).floor();
        let row_b = (b.bbox.y1 / bucket).floor();
        row_a.total_cmp(&row_b).then(a.bbox.x1.total_cmp(&b.bbox.x1))
    });
    for (i, region) in regions.iter_mut().enumerate() {
        region.order = i;
    }
}
