//! OCR and LLM collaborator interfaces.

use std::fmt;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::Result;
use crate::model::CanonicalLabel;

/// An OCR engine.
///
/// Engines are created once and reused; calls are serialized, so an engine
/// does not need to be reentrant.
pub trait OcrBackend: Send {
    /// Recognize the text of a cropped region.
    fn recognize(&mut self, image: &RgbImage, lang: &str) -> Result<String>;
}

/// A language model client that restructures OCR output.
pub trait LlmBackend: Send + Sync {
    /// Turn raw OCR text into the structure named by `hint`.
    fn structure(&self, raw: &str, hint: StructureHint, config: &LlmConfig) -> Result<String>;
}

/// Target structure requested from the LLM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureHint {
    /// Rows and columns (Markdown table)
    TableSchema,
    /// LaTeX math markup
    LatexMarkup,
    /// Short prose description of a picture or chart
    Description,
    /// Cleaned-up plain text
    PlainText,
}

impl StructureHint {
    pub fn for_label(label: CanonicalLabel) -> Self {
        match label {
            CanonicalLabel::Table => StructureHint::TableSchema,
            CanonicalLabel::Formula => StructureHint::LatexMarkup,
            CanonicalLabel::Figure => StructureHint::Description,
            _ => StructureHint::PlainText,
        }
    }
}

impl fmt::Display for StructureHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StructureHint::TableSchema => "table",
            StructureHint::LatexMarkup => "latex",
            StructureHint::Description => "description",
            StructureHint::PlainText => "text",
        })
    }
}
