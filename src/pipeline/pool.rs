//! Bounded worker pool for pages of one document.

use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::unbounded;
use rayon::ThreadPoolBuilder;

use super::page::{PageOutcome, PageProcessor};
use crate::config::ResolvedConfig;
use crate::error::{Error, Result};
use crate::source::PageSource;

/// Process `pages` on `workers` threads.
///
/// Workers pull the next index from a shared counter and send outcomes back
/// to the calling thread, which reports progress once per finished page.
/// The returned outcomes are in the order of `pages`.
pub(crate) fn process_pages(
    processor: &PageProcessor,
    source: &dyn PageSource,
    config: &ResolvedConfig,
    pages: &[u32],
    workers: usize,
    progress: &mut dyn FnMut(u32),
) -> Result<Vec<Result<PageOutcome>>> {
    let workers = workers.min(pages.len()).max(1);
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("docviz-page-{i}"))
        .build()
        .map_err(|e| Error::Other(format!("failed to start worker pool: {e}")))?;

    let next = AtomicUsize::new(0);
    let (tx, rx) = unbounded::<(usize, Result<PageOutcome>)>();
    let mut slots: Vec<Option<Result<PageOutcome>>> = (0..pages.len()).map(|_| None).collect();

    pool.in_place_scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let next = &next;
            scope.spawn(move |_| loop {
                let index = next.fetch_add(1, Ordering::SeqCst);
                let Some(&page) = pages.get(index) else {
                    break;
                };
                let outcome = processor.process(page, source, config);
                if tx.send((index, outcome)).is_err() {
                    break;
                }
            });
        }
        drop(tx);

        let mut completed = 0;
        for (index, outcome) in rx.iter() {
            completed += 1;
            progress(completed);
            slots[index] = Some(outcome);
        }
    });

    Ok(slots
        .into_iter()
        .zip(pages)
        .map(|(slot, &page)| {
            slot.unwrap_or_else(|| {
                Err(Error::PageRender {
                    page,
                    reason: "worker exited without a result".to_string(),
                })
            })
        })
        .collect())
}
