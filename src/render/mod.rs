//! Export of extraction results to JSON, Markdown and plain text.

mod json;
mod markdown;
mod text;

pub use json::{to_json, JsonFormat};
pub use markdown::{to_markdown, MarkdownRenderer};
pub use text::to_text;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::ExtractionResult;

/// File format for [`save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveFormat {
    #[default]
    Json,
    Markdown,
    Text,
}

impl SaveFormat {
    /// Guess the format from a file extension (`json`, `md`, `txt`, ...).
    pub fn from_extension(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(SaveFormat::Json),
            "md" | "markdown" => Some(SaveFormat::Markdown),
            "txt" | "text" => Some(SaveFormat::Text),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            SaveFormat::Json => "json",
            SaveFormat::Markdown => "md",
            SaveFormat::Text => "txt",
        }
    }
}

/// Render `result` in `format`.
pub fn render(result: &ExtractionResult, format: SaveFormat) -> Result<String> {
    match format {
        SaveFormat::Json => to_json(result, JsonFormat::Pretty),
        SaveFormat::Markdown => Ok(to_markdown(result)),
        SaveFormat::Text => Ok(to_text(result)),
    }
}

/// Write `result` to `path` in `format`.
pub fn save(result: &ExtractionResult, path: impl AsRef<Path>, format: SaveFormat) -> Result<()> {
    let path = path.as_ref();
    let content = render(result, format)?;
    fs::write(path, content)?;
    log::debug!("Saved {} entries to {}", result.len(), path.display());
    Ok(())
}
