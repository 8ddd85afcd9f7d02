//! Async entry point.

#![cfg(feature = "async")]

mod common;

use common::*;
use docviz::ResolvedConfig;

#[tokio::test]
async fn test_run_async_matches_blocking() {
    let pipeline = pipeline(MockBackend::new(3));
    let config = ResolvedConfig::default();

    let async_result = pipeline
        .run_async(&doc("paper.pdf"), &config, None)
        .await
        .unwrap();
    let blocking = pipeline.run(&doc("paper.pdf"), &config, None, None).unwrap();

    assert_eq!(async_result.entries, blocking.entries);
}

#[tokio::test]
async fn test_run_async_page_range() {
    let result = pipeline(MockBackend::new(5))
        .run_async(&doc("paper.pdf"), &ResolvedConfig::default(), Some(2..=3))
        .await
        .unwrap();
    assert_eq!(result.metadata.stats.pages_processed, 2);
}
