//! Data model shared by every pipeline stage.
//!
//! Documents go in, [`ExtractionResult`]s and [`ExtractionChunk`]s come out.
//! Regions and labels are the vocabulary in between.

mod document;
mod entry;
mod extraction_type;
mod label;
mod region;
mod result;

pub use document::Document;
pub use entry::{ExtractionEntry, Provenance};
pub use extraction_type::{resolve_includes, ExtractionType};
pub use label::CanonicalLabel;
pub use region::{BoundingBox, Region};
pub use result::{ExtractionChunk, ExtractionResult, ExtractionStats, ResultMetadata, Warning};
