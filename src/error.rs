//! Error types for docviz.

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for docviz operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting content.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A caller-supplied configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The document cannot be opened at all.
    #[error("Source unavailable: {path}: {reason}")]
    SourceUnavailable {
        /// Path of the document
        path: PathBuf,
        /// Why it could not be opened
        reason: String,
    },

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// A page could not be rasterized.
    #[error("Failed to render page {page}: {reason}")]
    PageRender {
        /// 1-indexed page number
        page: u32,
        /// Backend message
        reason: String,
    },

    /// The layout detection backend failed on a page.
    #[error("Layout detection failed: {0}")]
    Detection(String),

    /// A single region could not be extracted.
    #[error("Region extraction failed on page {page}: {reason}")]
    RegionExtraction {
        /// 1-indexed page number
        page: u32,
        /// Underlying OCR/LLM/crop failure
        reason: String,
    },

    /// The OCR engine returned an error.
    #[error("OCR error: {0}")]
    Ocr(String),

    /// The LLM client returned an error.
    #[error("LLM error: {0}")]
    Llm(String),

    /// The layout model artifact cannot be found.
    #[error("Model artifact not found: {0}")]
    ModelUnavailable(PathBuf),

    /// Error while exporting a result.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Coarse category of this error, used for error descriptors on results.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidConfig(_) => ErrorKind::Config,
            Error::SourceUnavailable { .. }
            | Error::UnknownFormat
            | Error::UnsupportedVersion(_)
            | Error::PdfParse(_)
            | Error::Io(_) => ErrorKind::SourceUnavailable,
            Error::PageRender { .. } | Error::PageOutOfRange(..) | Error::Detection(_) => {
                ErrorKind::PageRender
            }
            Error::RegionExtraction { .. } | Error::Ocr(_) | Error::Llm(_) => {
                ErrorKind::RegionExtraction
            }
            Error::ModelUnavailable(_) => ErrorKind::Config,
            Error::Render(_) | Error::Other(_) => ErrorKind::Other,
        }
    }

    /// Wrap this error as a failure of one region on `page`.
    pub fn into_region_error(self, page: u32) -> Error {
        match self {
            e @ Error::RegionExtraction { .. } => e,
            other => Error::RegionExtraction {
                page,
                reason: other.to_string(),
            },
        }
    }

    pub(crate) fn source_unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::SourceUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Error categories surfaced on results instead of being raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller configuration mistake
    Config,
    /// Document missing or unreadable
    SourceUnavailable,
    /// Page could not be rendered or analyzed
    PageRender,
    /// OCR or LLM failure on one region
    RegionExtraction,
    /// Anything else
    Other,
}

/// Serializable record of an error absorbed by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    /// Error category
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
}

impl From<&Error> for ErrorDescriptor {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::PdfParse(err.to_string()),
        }
    }
}
