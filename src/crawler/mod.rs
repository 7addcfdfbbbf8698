//! Crawler module for web page fetching and indexing
//!
//! This module contains the crawling pipeline:
//! - HTTP fetching with site-relative link extraction
//! - HTML parsing (links, title, plain text)
//! - Per-site recursive traversal with a bounded worker pool
//! - Process-wide indexing lifecycle (start, stop, single-page re-index)

mod coordinator;
mod fetcher;
mod parser;
mod site_crawler;

pub use coordinator::{IndexPageError, IndexingCoordinator};
pub use fetcher::{FetchError, FetchedPage, PageFetcher};
pub use parser::{extract_body_text, extract_relative_links, extract_title};

use crate::storage::StoreError;
use thiserror::Error;

/// Failure while indexing a single page
///
/// Fetch failures abandon just the affected path; store failures that
/// outlive the transaction retry loop do the same. Neither aborts the
/// owning site crawl.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
