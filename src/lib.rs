//! Lindex: a site-scoped crawling search engine
//!
//! This crate crawls a configured set of web sites, reduces page text to
//! lemmas, maintains a persistent inverted index in SQLite, and answers
//! ranked multi-term queries with snippet extraction through a small
//! HTTP API.

pub mod analyzer;
pub mod api;
pub mod config;
pub mod crawler;
pub mod search;
pub mod stats;
pub mod storage;

use thiserror::Error;

/// Main error type for Lindex operations
#[derive(Debug, Error)]
pub enum LindexError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Crawl error: {0}")]
    Crawl(#[from] crawler::CrawlError),

    #[error("Search error: {0}")]
    Search(#[from] search::SearchError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Lindex operations
pub type Result<T> = std::result::Result<T, LindexError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use analyzer::LemmaAnalyzer;
pub use config::Config;
pub use crawler::{IndexingCoordinator, PageFetcher};
pub use search::SearchEngine;
pub use storage::{SiteStatus, Store};
