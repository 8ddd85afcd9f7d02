//! Native text layer of a page.
//!
//! Coordinates are page points with a top-left origin, so they line up with
//! rendered images once multiplied by the zoom factors.

use serde::{Deserialize, Serialize};

use crate::model::BoundingBox;

/// Minimum share of a span's area that must fall inside a region.
const MIN_SPAN_OVERLAP: f32 = 0.5;

/// A run of text drawn with one font at one position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position of the baseline, measured from the top of the page
    pub baseline: f32,
    /// Advance width of the text
    pub width: f32,
    /// Font size in points
    pub font_size: f32,
}

impl TextSpan {
    pub fn new(text: impl Into<String>, x: f32, baseline: f32, width: f32, font_size: f32) -> Self {
        Self {
            text: text.into(),
            x,
            baseline,
            width,
            font_size,
        }
    }

    /// Approximate ink box (80% ascender, 20% descender).
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(
            self.x,
            self.baseline - self.font_size * 0.8,
            self.x + self.width,
            self.baseline + self.font_size * 0.2,
        )
    }

    fn overlap_ratio(&self, region: &BoundingBox) -> f32 {
        let bbox = self.bbox();
        let area = bbox.area();
        if area <= 0.0 {
            // Zero-width span: fall back to its anchor point.
            let inside = self.x >= region.x1
                && self.x <= region.x2
                && self.baseline >= region.y1
                && self.baseline <= region.y2;
            return if inside { 1.0 } else { 0.0 };
        }
        bbox.intersection_area(region) / area
    }
}

/// Positioned text of one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextLayer {
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Spans in content-stream order
    pub spans: Vec<TextSpan>,
}

impl TextLayer {
    pub fn new(width: f32, height: f32, spans: Vec<TextSpan>) -> Self {
        Self {
            width,
            height,
            spans,
        }
    }

    /// Whether the page carries no text at all.
    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|s| s.text.trim().is_empty())
    }

    /// Text inside a region given in rendered-image pixels.
    ///
    /// Spans with at least half of their area inside the region are grouped
    /// into lines by baseline and joined in reading order.
    pub fn text_within(&self, region: &BoundingBox, zoom_x: f32, zoom_y: f32) -> String {
        let region = region.unscale(zoom_x, zoom_y);
        let selected = self
            .spans
            .iter()
            .filter(|s| s.overlap_ratio(&region) >= MIN_SPAN_OVERLAP)
            .collect();
        join_lines(selected)
    }

    /// Text of the whole page in reading order.
    pub fn full_text(&self) -> String {
        join_lines(self.spans.iter().collect())
    }
}

fn join_lines(mut spans: Vec<&TextSpan>) -> String {
    if spans.is_empty() {
        return String::new();
    }

    spans.sort_by(|a, b| a.baseline.total_cmp(&b.baseline).then(a.x.total_cmp(&b.x)));

    let mut lines: Vec<Vec<&TextSpan>> = Vec::new();
    let mut current_y: Option<f32> = None;
    for span in spans {
        let tolerance = span.font_size * 0.3;
        match current_y {
            Some(y) if (span.baseline - y).abs() <= tolerance => {
                if let Some(line) = lines.last_mut() {
                    line.push(span);
                }
            }
            _ => {
                current_y = Some(span.baseline);
                lines.push(vec![span]);
            }
        }
    }

    lines
        .into_iter()
        .map(line_text)
        .filter(|l| !l.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Join the spans of one line, inserting spaces at visible gaps.
fn line_text(mut spans: Vec<&TextSpan>) -> String {
    spans.sort_by(|a, b| a.x.total_cmp(&b.x));

    let mut result = String::new();
    for (i, span) in spans.iter().enumerate() {
        if i > 0 {
            let prev = spans[i - 1];
            let gap = span.x - (prev.x + prev.width);

            let char_count = span.text.chars().count();
            let avg_char_width = if char_count > 0 && span.width > 0.0 {
                span.width / char_count as f32
            } else {
                span.font_size * 0.5
            };

            let both_spaceless = prev.text.chars().last().is_some_and(is_spaceless_script_char)
                && span.text.chars().next().is_some_and(is_spaceless_script_char);
            let has_space = result.ends_with(' ') || span.text.starts_with(' ');

            if gap > avg_char_width * 0.2 && !both_spaceless && !has_space {
                result.push(' ');
            }
        }
        result.push_str(&span.text);
    }
    result
}

/// Scripts written without spaces between words (Chinese, Japanese).
/// Hangul is not included: Korean uses word spaces.
pub(crate) fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        || (0x3040..=0x309F).contains(&code)
        || (0x30A0..=0x30FF).contains(&code)
        || (0x3000..=0x303F).contains(&code)
}
