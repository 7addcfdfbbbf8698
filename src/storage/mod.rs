//! Storage module for the persistent inverted index
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Site, page, lemma, and index-entry persistence
//! - Cascading purges that keep lemma frequencies consistent
//! - Transaction retry on lock conflicts

mod schema;
mod store;

pub use store::Store;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("transaction retries exhausted after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Indexing status of a site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteStatus {
    Indexing,
    Indexed,
    Failed,
}

impl SiteStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Indexing => "INDEXING",
            Self::Indexed => "INDEXED",
            Self::Failed => "FAILED",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "INDEXING" => Some(Self::Indexing),
            "INDEXED" => Some(Self::Indexed),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Represents a site in the database
#[derive(Debug, Clone)]
pub struct SiteRecord {
    pub id: i64,
    pub url: String,
    pub name: String,
    pub status: SiteStatus,
    pub status_time: DateTime<Utc>,
    pub last_error: Option<String>,
}

/// Represents a fetched page of a site
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub id: i64,
    pub site_id: i64,
    pub path: String,
    pub code: u16,
    pub content: String,
}

/// Represents a lemma observed on a site
///
/// `frequency` is the number of distinct pages of the owning site on
/// which the lemma appears.
#[derive(Debug, Clone)]
pub struct LemmaRecord {
    pub id: i64,
    pub site_id: i64,
    pub lemma: String,
    pub frequency: i64,
}
