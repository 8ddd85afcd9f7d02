//! Geometry and detected regions.

use serde::{Deserialize, Serialize};

use super::CanonicalLabel;

/// Axis-aligned box with a top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x1: f32,
    /// Top edge
    pub y1: f32,
    /// Right edge
    pub x2: f32,
    /// Bottom edge
    pub y2: f32,
}

impl BoundingBox {
    /// Create a box from its edges, normalizing swapped coordinates.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// Create a box from origin and size.
    pub fn from_size(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f32 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    /// Whether the box has no area. NaN edges count as empty.
    pub fn is_empty(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Area shared with `other`.
    pub fn intersection_area(&self, other: &BoundingBox) -> f32 {
        let w = self.x2.min(other.x2) - self.x1.max(other.x1);
        let h = self.y2.min(other.y2) - self.y1.max(other.y1);
        if w <= 0.0 || h <= 0.0 {
            0.0
        } else {
            w * h
        }
    }

    /// Divide every coordinate by the given factors (pixels → points).
    pub fn unscale(&self, sx: f32, sy: f32) -> BoundingBox {
        BoundingBox::new(self.x1 / sx, self.y1 / sy, self.x2 / sx, self.y2 / sy)
    }

    /// Clip to `[0, width] x [0, height]`.
    pub fn clamp(&self, width: f32, height: f32) -> BoundingBox {
        BoundingBox::new(
            self.x1.clamp(0.0, width),
            self.y1.clamp(0.0, height),
            self.x2.clamp(0.0, width),
            self.y2.clamp(0.0, height),
        )
    }
}

/// A labeled area of one rendered page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Page number (1-indexed)
    pub page: u32,

    /// Box in rendered-image pixels
    pub bbox: BoundingBox,

    /// Canonical semantic label
    pub label: CanonicalLabel,

    /// Detector confidence in [0, 1]
    pub confidence: f32,

    /// Position in the page's reading order (0-based)
    pub order: usize,
}

impl Region {
    pub fn new(page: u32, bbox: BoundingBox, label: CanonicalLabel, confidence: f32) -> Self {
        Self {
            page,
            bbox,
            label,
            confidence,
            order: 0,
        }
    }
}
