//! Ranked retrieval over the persisted index
//!
//! Queries are reduced to lemmas with the same analyzer the crawler
//! uses, filtered by document frequency, intersected over pages, scored
//! by rank sums, and decorated with highlighted snippets.

mod engine;
mod snippet;

pub use engine::{SearchEngine, SearchHit, SearchOutcome};
pub use snippet::build_snippet;

use crate::storage::StoreError;
use thiserror::Error;

/// Failure answering a search request
///
/// Reported to the caller as `{result: false, error}`; never retried.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("empty query")]
    EmptyQuery,

    #[error("no pages found")]
    NoResults,

    #[error("search failed")]
    Store(#[from] StoreError),
}
