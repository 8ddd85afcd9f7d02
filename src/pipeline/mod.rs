//! Document-level orchestration.
//!
//! [`Pipeline::run`] walks a page range through the [`PageProcessor`] and
//! aggregates the outcomes. [`Pipeline::stream`] slices a document into
//! fixed-size page windows and runs them lazily, and [`Pipeline::run_many`]
//! repeats a run over several documents. All three share the same page
//! planning and aggregation.

mod page;
mod pool;
mod stream;

pub use page::{PageOutcome, PageProcessor};
pub use stream::ExtractionStream;

use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use crate::config::ResolvedConfig;
use crate::error::{Error, Result};
use crate::extract::ContentExtractor;
use crate::layout::RegionDetector;
use crate::model::{Document, ExtractionResult, ResultMetadata, Warning};
use crate::source::{PageSource, SourceBackend};

/// Progress callback receiving the number of completed items.
pub type Progress<'a> = &'a mut dyn FnMut(u32);

/// The extraction pipeline.
///
/// Cheap to clone: the source backend, detector and extractor are shared.
#[derive(Clone)]
pub struct Pipeline {
    backend: Arc<dyn SourceBackend>,
    processor: PageProcessor,
    workers: usize,
}

impl Pipeline {
    pub fn new(
        backend: Arc<dyn SourceBackend>,
        detector: Arc<RegionDetector>,
        extractor: Arc<ContentExtractor>,
    ) -> Self {
        Self {
            backend,
            processor: PageProcessor::new(detector, extractor),
            workers: 1,
        }
    }

    /// Process pages on up to `workers` threads (1 = sequential).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn backend(&self) -> &dyn SourceBackend {
        self.backend.as_ref()
    }

    /// Extract a document.
    ///
    /// Pages come from `page_range` (default: every page) clipped to the document,
    /// then truncated to `page_limit`. `progress` is called once per page with
    /// the number of pages completed so far. Page failures become warnings on
    /// the result; only invalid configuration and an unopenable source are
    /// returned as errors.
    pub fn run(
        &self,
        document: &Document,
        config: &ResolvedConfig,
        page_range: Option<RangeInclusive<u32>>,
        progress: Option<Progress<'_>>,
    ) -> Result<ExtractionResult> {
        config.validate()?;
        let started_at = Utc::now();
        let timer = Instant::now();

        let path = document.path();
        let source = self
            .backend
            .open(path)
            .map_err(|e| as_source_unavailable(path, e))?;
        let page_count = source
            .page_count()
            .map_err(|e| as_source_unavailable(path, e))?;

        let pages = plan_pages(page_count, page_range, config.extraction.page_limit);
        log::info!(
            "Extracting {} of {} pages from {}",
            pages.len(),
            page_count,
            path.display()
        );

        let mut noop = |_: u32| {};
        let progress: &mut dyn FnMut(u32) = match progress {
            Some(progress) => progress,
            None => &mut noop,
        };
        let outcomes = self.process_pages(source.as_ref(), config, &pages, progress)?;

        let mut result = ExtractionResult {
            entries: Vec::new(),
            metadata: ResultMetadata {
                source: Some(path.to_path_buf()),
                start_page: pages.first().copied(),
                end_page: pages.last().copied(),
                started_at: Some(started_at),
                ..Default::default()
            },
        };
        for (&page, outcome) in pages.iter().zip(outcomes) {
            aggregate(&mut result, page, outcome);
        }
        result.metadata.elapsed_ms = timer.elapsed().as_millis() as u64;

        let stats = &result.metadata.stats;
        log::info!(
            "Extracted {} entries from {} pages ({} failed) in {} ms",
            result.len(),
            stats.pages_processed,
            stats.pages_failed,
            result.metadata.elapsed_ms
        );
        Ok(result)
    }

    /// Async entry point. A thin suspension wrapper over [`run`](Self::run):
    /// pages are not overlapped beyond what [`with_workers`](Self::with_workers)
    /// configures.
    #[cfg(feature = "async")]
    pub async fn run_async(
        &self,
        document: &Document,
        config: &ResolvedConfig,
        page_range: Option<RangeInclusive<u32>>,
    ) -> Result<ExtractionResult> {
        tokio::task::yield_now().await;
        self.run(document, config, page_range, None)
    }

    /// Lazily extract `document` in windows of `chunk_size` pages.
    ///
    /// Fails before any I/O if `chunk_size` is 0 or `config` is invalid.
    pub fn stream(
        &self,
        document: &Document,
        chunk_size: u32,
        config: &ResolvedConfig,
    ) -> Result<ExtractionStream> {
        if chunk_size == 0 {
            return Err(Error::InvalidConfig(
                "chunk_size must be positive".to_string(),
            ));
        }
        config.validate()?;

        let page_count = document.page_count(self.backend.as_ref());
        let last_page = match config.extraction.page_limit {
            Some(limit) => page_count.min(limit),
            None => page_count,
        };
        Ok(ExtractionStream::new(
            self.clone(),
            document.clone(),
            config.clone(),
            chunk_size,
            last_page,
        ))
    }

    /// Extract several documents one after the other.
    ///
    /// Returns one result per document, in input order. A document that
    /// cannot be processed yields an empty result carrying an error
    /// descriptor; the remaining documents are unaffected. `progress` is
    /// called once per finished document.
    pub fn run_many(
        &self,
        documents: &[Document],
        config: &ResolvedConfig,
        mut progress: Option<Progress<'_>>,
    ) -> Result<Vec<ExtractionResult>> {
        config.validate()?;

        let mut results = Vec::with_capacity(documents.len());
        for (i, document) in documents.iter().enumerate() {
            let result = self.run(document, config, None, None).unwrap_or_else(|e| {
                log::warn!("Skipping {}: {}", document.path().display(), e);
                ExtractionResult::failed(Some(document.path().to_path_buf()), &e)
            });
            results.push(result);
            if let Some(progress) = progress.as_mut() {
                progress(i as u32 + 1);
            }
        }
        Ok(results)
    }

    fn process_pages(
        &self,
        source: &dyn PageSource,
        config: &ResolvedConfig,
        pages: &[u32],
        progress: &mut dyn FnMut(u32),
    ) -> Result<Vec<Result<PageOutcome>>> {
        if self.workers > 1 && pages.len() > 1 {
            return pool::process_pages(
                &self.processor,
                source,
                config,
                pages,
                self.workers,
                progress,
            );
        }

        let mut outcomes = Vec::with_capacity(pages.len());
        for (i, &page) in pages.iter().enumerate() {
            outcomes.push(self.processor.process(page, source, config));
            progress(i as u32 + 1);
        }
        Ok(outcomes)
    }
}

/// Pages to process: `range` (default: all) clipped to `1..=page_count`,
/// truncated to `limit`.
pub(crate) fn plan_pages(
    page_count: u32,
    range: Option<RangeInclusive<u32>>,
    limit: Option<u32>,
) -> Vec<u32> {
    let (start, end) = match range {
        Some(range) => ((*range.start()).max(1), (*range.end()).min(page_count)),
        None => (1, page_count),
    };
    if start > end {
        return Vec::new();
    }
    let limit = limit.map_or(usize::MAX, |l| l as usize);
    (start..=end).take(limit).collect()
}

fn aggregate(result: &mut ExtractionResult, page: u32, outcome: Result<PageOutcome>) {
    let metadata = &mut result.metadata;
    match outcome {
        Ok(outcome) => {
            let stats = &mut metadata.stats;
            stats.pages_processed += 1;
            stats.regions_detected += outcome.detected;
            stats.regions_excluded += outcome.excluded;
            stats.regions_skipped += outcome.skipped;
            stats.entries_filtered += outcome.filtered;
            for entry in &outcome.entries {
                stats.add_entry(entry);
            }
            metadata.warnings.extend(outcome.warnings);
            result.entries.extend(outcome.entries);
        }
        Err(e) => {
            log::warn!("Page {} failed: {}", page, e);
            metadata.stats.pages_failed += 1;
            metadata.warnings.push(Warning::for_page(page, &e));
        }
    }
}

fn as_source_unavailable(path: &Path, err: Error) -> Error {
    match err {
        e @ Error::SourceUnavailable { .. } => e,
        other => Error::source_unavailable(path, other),
    }
}
