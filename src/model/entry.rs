//! Extracted content entries.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{CanonicalLabel, ExtractionType, Region};

/// Where an entry's content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// The document's embedded text layer
    NativeText,
    /// Raw OCR output
    Ocr,
    /// OCR output restructured by the LLM
    Llm,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provenance::NativeText => "native-text",
            Provenance::Ocr => "ocr",
            Provenance::Llm => "llm",
        })
    }
}

/// One piece of extracted content. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionEntry {
    /// Output category
    pub kind: ExtractionType,

    /// Page number (1-indexed)
    pub page: u32,

    /// Label of the region the entry was produced from
    pub label: CanonicalLabel,

    /// Text or structured payload (Markdown table, LaTeX, ...)
    pub content: String,

    /// Source region; absent for whole-page and native-text extractions
    pub region: Option<Region>,

    /// Detector confidence of the source region, if any
    pub confidence: Option<f32>,

    /// How the content was obtained
    pub provenance: Provenance,
}

impl ExtractionEntry {
    /// Entry read from the native text layer.
    pub fn native_text(page: u32, label: CanonicalLabel, content: String) -> Self {
        Self {
            kind: label.extraction_type(),
            page,
            label,
            content,
            region: None,
            confidence: None,
            provenance: Provenance::NativeText,
        }
    }

    /// Entry recognized from pixels, optionally restructured by the LLM.
    pub fn recognized(
        page: u32,
        label: CanonicalLabel,
        content: String,
        region: Option<Region>,
        provenance: Provenance,
    ) -> Self {
        let confidence = region.as_ref().map(|r| r.confidence);
        Self {
            kind: label.extraction_type(),
            page,
            label,
            content,
            region,
            confidence,
            provenance,
        }
    }

    /// Whether the entry carries no visible text.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundingBox;

    #[test]
    fn test_native_text_entry_has_no_region() {
        let entry = ExtractionEntry::native_text(2, CanonicalLabel::Title, "Intro".to_string());
        assert_eq!(entry.kind, ExtractionType::Text);
        assert_eq!(entry.provenance, Provenance::NativeText);
        assert!(entry.region.is_none());
        assert!(entry.confidence.is_none());
    }

    #[test]
    fn test_recognized_entry_copies_confidence() {
        let region = Region::new(
            1,
            BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            CanonicalLabel::Table,
            0.87,
        );
        let entry = ExtractionEntry::recognized(
            1,
            CanonicalLabel::Table,
            "| a |".to_string(),
            Some(region),
            Provenance::Llm,
        );
        assert_eq!(entry.kind, ExtractionType::Table);
        assert_eq!(entry.confidence, Some(0.87));
    }

    #[test]
    fn test_provenance_display() {
        assert_eq!(Provenance::NativeText.to_string(), "native-text");
        assert_eq!(Provenance::Llm.to_string(), "llm");
    }
}
