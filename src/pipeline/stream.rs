//! Chunked, pull-based extraction.

use crate::config::ResolvedConfig;
use crate::model::{Document, ExtractionChunk, ExtractionResult};

use super::Pipeline;

/// Lazy iterator over consecutive page windows of one document.
///
/// Each call to `next` runs the pipeline on one window; nothing is computed
/// ahead of time, so dropping the iterator stops the work.
pub struct ExtractionStream {
    pipeline: Pipeline,
    document: Document,
    config: ResolvedConfig,
    chunk_size: u32,
    last_page: u32,
    next_page: u32,
}

impl ExtractionStream {
    pub(crate) fn new(
        pipeline: Pipeline,
        document: Document,
        config: ResolvedConfig,
        chunk_size: u32,
        last_page: u32,
    ) -> Self {
        Self {
            pipeline,
            document,
            config,
            chunk_size,
            last_page,
            next_page: 1,
        }
    }

    /// Last page the stream will cover (0 for an empty document).
    pub fn last_page(&self) -> u32 {
        self.last_page
    }

    /// Number of windows not yet produced.
    pub fn remaining(&self) -> usize {
        if self.next_page > self.last_page {
            return 0;
        }
        let pages = self.last_page - self.next_page + 1;
        pages.div_ceil(self.chunk_size) as usize
    }

    /// Drain the stream into one result.
    pub fn collect_result(self) -> ExtractionResult {
        let mut merged = ExtractionResult::new();
        for chunk in self {
            if merged.metadata.source.is_none() {
                merged.metadata.source = chunk.result.metadata.source.clone();
                merged.metadata.started_at = chunk.result.metadata.started_at;
            }
            merged.append(chunk.result);
        }
        merged
    }
}

impl Iterator for ExtractionStream {
    type Item = ExtractionChunk;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_page > self.last_page {
            return None;
        }
        let start = self.next_page;
        let end = start.saturating_add(self.chunk_size - 1).min(self.last_page);
        self.next_page = end + 1;

        let window = self
            .config
            .with_extraction(self.config.extraction.clone().with_page_limit(end - start + 1));
        log::debug!(
            "Streaming pages {}-{} of {}",
            start,
            end,
            self.document.path().display()
        );

        let result = match self.pipeline.run(&self.document, &window, Some(start..=end), None) {
            Ok(result) => result,
            Err(e) => {
                log::warn!("Pages {}-{} failed: {}", start, end, e);
                let mut failed =
                    ExtractionResult::failed(Some(self.document.path().to_path_buf()), &e);
                failed.metadata.start_page = Some(start);
                failed.metadata.end_page = Some(end);
                failed
            }
        };

        Some(ExtractionChunk {
            result,
            start_page: start,
            end_page: end,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ExtractionStream {}
