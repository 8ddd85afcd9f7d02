//! Backend-independent region vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ExtractionType;

/// Semantic type of a detected region.
///
/// Every raw label a detection backend can emit is mapped onto one of these
/// variants; anything unrecognized becomes [`CanonicalLabel::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalLabel {
    /// Tabular data
    Table,
    /// Body text paragraph
    Text,
    /// Document or section title
    Title,
    /// Caption attached to a figure, table or formula
    Caption,
    /// Item of a bulleted or numbered list
    ListItem,
    /// Picture, chart or diagram
    Figure,
    /// Display formula
    Formula,
    /// Source code listing
    Code,
    /// Bibliography entry
    Reference,
    /// Running header
    PageHeader,
    /// Running footer
    PageFooter,
    /// Footnote
    Footnote,
    /// Anything else
    Other,
}

impl CanonicalLabel {
    /// All labels, in declaration order.
    pub const ALL: [CanonicalLabel; 13] = [
        CanonicalLabel::Table,
        CanonicalLabel::Text,
        CanonicalLabel::Title,
        CanonicalLabel::Caption,
        CanonicalLabel::ListItem,
        CanonicalLabel::Figure,
        CanonicalLabel::Formula,
        CanonicalLabel::Code,
        CanonicalLabel::Reference,
        CanonicalLabel::PageHeader,
        CanonicalLabel::PageFooter,
        CanonicalLabel::Footnote,
        CanonicalLabel::Other,
    ];

    /// Whether the native PDF text layer is a usable source for this label.
    pub fn is_text_like(self) -> bool {
        match self {
            CanonicalLabel::Text
            | CanonicalLabel::Title
            | CanonicalLabel::Caption
            | CanonicalLabel::ListItem
            | CanonicalLabel::Code
            | CanonicalLabel::Reference
            | CanonicalLabel::PageHeader
            | CanonicalLabel::PageFooter
            | CanonicalLabel::Footnote => true,
            CanonicalLabel::Table
            | CanonicalLabel::Figure
            | CanonicalLabel::Formula
            | CanonicalLabel::Other => false,
        }
    }

    /// Output category of entries produced from this label.
    pub fn extraction_type(self) -> ExtractionType {
        match self {
            CanonicalLabel::Table => ExtractionType::Table,
            CanonicalLabel::Text
            | CanonicalLabel::Title
            | CanonicalLabel::Caption
            | CanonicalLabel::ListItem
            | CanonicalLabel::Footnote => ExtractionType::Text,
            CanonicalLabel::Figure => ExtractionType::Figure,
            CanonicalLabel::Formula => ExtractionType::Equation,
            CanonicalLabel::Code => ExtractionType::Code,
            CanonicalLabel::Reference => ExtractionType::Reference,
            CanonicalLabel::PageHeader | CanonicalLabel::PageFooter | CanonicalLabel::Other => {
                ExtractionType::Other
            }
        }
    }

    /// Stable snake_case name.
    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalLabel::Table => "table",
            CanonicalLabel::Text => "text",
            CanonicalLabel::Title => "title",
            CanonicalLabel::Caption => "caption",
            CanonicalLabel::ListItem => "list_item",
            CanonicalLabel::Figure => "figure",
            CanonicalLabel::Formula => "formula",
            CanonicalLabel::Code => "code",
            CanonicalLabel::Reference => "reference",
            CanonicalLabel::PageHeader => "page_header",
            CanonicalLabel::PageFooter => "page_footer",
            CanonicalLabel::Footnote => "footnote",
            CanonicalLabel::Other => "other",
        }
    }
}

impl fmt::Display for CanonicalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
