//! Extraction results, chunks and statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{ExtractionEntry, ExtractionType, Provenance};
use crate::error::{Error, ErrorDescriptor, ErrorKind};

/// Ordered entries of one extraction run plus provenance metadata.
///
/// Entries are ordered by page number, then by region reading order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Extracted entries
    pub entries: Vec<ExtractionEntry>,

    /// Run metadata (stats, warnings, error marker)
    pub metadata: ResultMetadata,
}

impl ExtractionResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty result marked as failed.
    pub fn failed(source: Option<PathBuf>, err: &Error) -> Self {
        Self {
            entries: Vec::new(),
            metadata: ResultMetadata {
                source,
                error: Some(ErrorDescriptor::from(err)),
                ..Default::default()
            },
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the result has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the whole run failed (as opposed to individual pages/regions).
    pub fn is_failed(&self) -> bool {
        self.metadata.error.is_some()
    }

    /// Entries of one kind, in order.
    pub fn entries_of(&self, kind: ExtractionType) -> impl Iterator<Item = &ExtractionEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    /// Entries of one page, in order.
    pub fn page_entries(&self, page: u32) -> impl Iterator<Item = &ExtractionEntry> {
        self.entries.iter().filter(move |e| e.page == page)
    }

    /// Concatenated content of every entry.
    pub fn plain_text(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Append another result (e.g. the next chunk) to this one.
    pub fn append(&mut self, other: ExtractionResult) {
        self.entries.extend(other.entries);
        self.metadata.stats.merge(&other.metadata.stats);
        self.metadata.warnings.extend(other.metadata.warnings);
        self.metadata.elapsed_ms += other.metadata.elapsed_ms;
        self.metadata.start_page = match (self.metadata.start_page, other.metadata.start_page) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.metadata.end_page = self.metadata.end_page.max(other.metadata.end_page);
        if self.metadata.error.is_none() {
            self.metadata.error = other.metadata.error;
        }
    }
}

/// Provenance metadata attached to a result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultMetadata {
    /// Source document path
    pub source: Option<PathBuf>,

    /// First page covered (1-indexed, inclusive)
    pub start_page: Option<u32>,

    /// Last page covered (1-indexed, inclusive)
    pub end_page: Option<u32>,

    /// When the run started
    pub started_at: Option<DateTime<Utc>>,

    /// Wall-clock duration of the run
    pub elapsed_ms: u64,

    /// Extraction statistics
    pub stats: ExtractionStats,

    /// Recoverable problems (failed pages, unreadable text layers)
    pub warnings: Vec<Warning>,

    /// Set when the whole run failed; the result then has no entries
    pub error: Option<ErrorDescriptor>,
}

/// A recoverable problem recorded during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// Page the warning refers to, if any
    pub page: Option<u32>,

    /// Error category
    pub kind: ErrorKind,

    /// Human-readable message
    pub message: String,
}

impl Warning {
    /// Warning for a page-level error.
    pub fn for_page(page: u32, err: &Error) -> Self {
        Self {
            page: Some(page),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Statistics collected during extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Pages processed successfully
    pub pages_processed: u32,

    /// Pages that contributed nothing because of an error
    pub pages_failed: u32,

    /// Regions returned by the detector
    pub regions_detected: u32,

    /// Regions skipped because their label is excluded
    pub regions_excluded: u32,

    /// Regions skipped because OCR/LLM failed
    pub regions_skipped: u32,

    /// Entries dropped by the `includes` filter
    pub entries_filtered: u32,

    /// Entries taken from the native text layer
    pub native_text_entries: u32,

    /// Entries produced by OCR
    pub ocr_entries: u32,

    /// Entries produced by OCR + LLM
    pub llm_entries: u32,

    /// Approximate word count (whitespace-separated tokens)
    pub word_count: u32,

    /// Character count (excluding whitespace)
    pub char_count: u32,
}

impl ExtractionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one kept entry.
    pub fn add_entry(&mut self, entry: &ExtractionEntry) {
        match entry.provenance {
            Provenance::NativeText => self.native_text_entries += 1,
            Provenance::Ocr => self.ocr_entries += 1,
            Provenance::Llm => self.llm_entries += 1,
        }
        self.count_text(&entry.content);
    }

    /// Add word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        self.word_count += text.split_whitespace().count() as u32;
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
    }

    /// Total kept entries.
    pub fn entry_count(&self) -> u32 {
        self.native_text_entries + self.ocr_entries + self.llm_entries
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.pages_processed += other.pages_processed;
        self.pages_failed += other.pages_failed;
        self.regions_detected += other.regions_detected;
        self.regions_excluded += other.regions_excluded;
        self.regions_skipped += other.regions_skipped;
        self.entries_filtered += other.entries_filtered;
        self.native_text_entries += other.native_text_entries;
        self.ocr_entries += other.ocr_entries;
        self.llm_entries += other.llm_entries;
        self.word_count += other.word_count;
        self.char_count += other.char_count;
    }
}

/// A contiguous page-range slice of a streamed extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionChunk {
    /// Entries of this window
    pub result: ExtractionResult,

    /// First page of the window (1-indexed, inclusive)
    pub start_page: u32,

    /// Last page of the window (1-indexed, inclusive)
    pub end_page: u32,
}

impl ExtractionChunk {
    /// Number of pages the window covers.
    pub fn page_count(&self) -> u32 {
        self.end_page - self.start_page + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CanonicalLabel;

    fn entry(page: u32, text: &str, provenance: Provenance) -> ExtractionEntry {
        ExtractionEntry::recognized(page, CanonicalLabel::Text, text.to_string(), None, provenance)
    }

    #[test]
    fn test_stats_count_text() {
        let mut stats = ExtractionStats::new();
        stats.count_text("Hello, world! This is a test.");

        assert_eq!(stats.word_count, 6);
        assert_eq!(stats.char_count, 24);
    }

    #[test]
    fn test_stats_add_entry_by_provenance() {
        let mut stats = ExtractionStats::new();
        stats.add_entry(&entry(1, "a", Provenance::Ocr));
        stats.add_entry(&entry(1, "b", Provenance::Llm));
        stats.add_entry(&entry(1, "c", Provenance::NativeText));

        assert_eq!(stats.ocr_entries, 1);
        assert_eq!(stats.llm_entries, 1);
        assert_eq!(stats.native_text_entries, 1);
        assert_eq!(stats.entry_count(), 3);
    }

    #[test]
    fn test_stats_merge() {
        let mut stats1 = ExtractionStats {
            pages_processed: 5,
            regions_skipped: 2,
            ..Default::default()
        };
        let stats2 = ExtractionStats {
            pages_processed: 3,
            regions_skipped: 1,
            pages_failed: 4,
            ..Default::default()
        };

        stats1.merge(&stats2);

        assert_eq!(stats1.pages_processed, 8);
        assert_eq!(stats1.regions_skipped, 3);
        assert_eq!(stats1.pages_failed, 4);
    }

    #[test]
    fn test_failed_result() {
        let err = Error::source_unavailable("a.pdf", "not found");
        let result = ExtractionResult::failed(Some(PathBuf::from("a.pdf")), &err);
        assert!(result.is_failed());
        assert!(result.is_empty());
        assert_eq!(
            result.metadata.error.as_ref().map(|e| e.kind),
            Some(ErrorKind::SourceUnavailable)
        );
    }

    #[test]
    fn test_append_keeps_order_and_range() {
        let mut first = ExtractionResult::new();
        first.entries.push(entry(1, "one", Provenance::Ocr));
        first.metadata.start_page = Some(1);
        first.metadata.end_page = Some(2);

        let mut second = ExtractionResult::new();
        second.entries.push(entry(3, "three", Provenance::Ocr));
        second.metadata.start_page = Some(3);
        second.metadata.end_page = Some(4);

        first.append(second);
        assert_eq!(first.len(), 2);
        assert_eq!(first.entries[1].page, 3);
        assert_eq!(first.metadata.start_page, Some(1));
        assert_eq!(first.metadata.end_page, Some(4));
        assert_eq!(first.page_entries(3).count(), 1);
    }

    #[test]
    fn test_chunk_page_count() {
        let chunk = ExtractionChunk {
            result: ExtractionResult::new(),
            start_page: 21,
            end_page: 25,
        };
        assert_eq!(chunk.page_count(), 5);
    }
}
