//! Page sources: rasterized pages and native text layers.
//!
//! A [`SourceBackend`] opens a document path into a [`PageSource`], an
//! ordered, finite and randomly addressable sequence of pages. The pipeline
//! never talks to a PDF library directly; it only sees these traits.

mod format;
mod lopdf_backend;
mod text_layer;

pub use format::{is_pdf_bytes, pdf_version_from_bytes, sniff_pdf_version};
pub use lopdf_backend::{LopdfBackend, LopdfSource, Rasterizer};
pub use text_layer::{TextLayer, TextSpan};

use std::path::Path;

use image::RgbImage;

use crate::error::{Error, Result};
use crate::model::BoundingBox;

/// Opens documents.
pub trait SourceBackend: Send + Sync {
    /// Open the document at `path`.
    fn open(&self, path: &Path) -> Result<Box<dyn PageSource>>;
}

/// An opened document.
///
/// Pages are 1-indexed. Implementations must be shareable across threads so
/// pages can be processed by a worker pool.
pub trait PageSource: Send + Sync {
    /// Number of pages.
    fn page_count(&self) -> Result<u32>;

    /// Rasterize a page. Idempotent: the same `(page, zoom)` always yields an
    /// equivalent image. Out-of-range pages fail with
    /// [`Error::PageOutOfRange`].
    fn render(&self, page: u32, zoom_x: f32, zoom_y: f32) -> Result<RenderedPage>;

    /// Native text of a page.
    fn text_layer(&self, page: u32) -> Result<TextLayer>;
}

/// A rasterized page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Page number (1-indexed)
    pub page: u32,
    /// Pixels
    pub image: RgbImage,
}

impl RenderedPage {
    pub fn new(page: u32, image: RgbImage) -> Self {
        Self { page, image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Box covering the whole image.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_size(0.0, 0.0, self.width() as f32, self.height() as f32)
    }

    /// Copy the pixels under `bbox`, clipped to the image.
    pub fn crop(&self, bbox: &BoundingBox) -> Result<RgbImage> {
        let clipped = bbox.clamp(self.width() as f32, self.height() as f32);
        let x = clipped.x1.floor() as u32;
        let y = clipped.y1.floor() as u32;
        let width = (clipped.x2.ceil() as u32).saturating_sub(x);
        let height = (clipped.y2.ceil() as u32).saturating_sub(y);
        if width == 0 || height == 0 {
            return Err(Error::RegionExtraction {
                page: self.page,
                reason: format!("region {bbox:?} lies outside the page"),
            });
        }
        Ok(image::imageops::crop_imm(&self.image, x, y, width, height).to_image())
    }
}
