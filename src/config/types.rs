use serde::Deserialize;

/// Main configuration structure for Lindex
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub fetch: FetchConfig,
    #[serde(default)]
    pub indexing: IndexingConfig,
    #[serde(default)]
    pub sites: Vec<SiteEntry>,
}

/// HTTP API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the API listens on
    #[serde(default = "default_address")]
    pub address: String,
}

/// Fetch identity configuration, applied to every outbound request
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header value
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Referer header value
    pub referrer: String,
}

/// Crawler and storage behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IndexingConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,

    /// Delay a worker sleeps after fetching a page (milliseconds)
    #[serde(rename = "page-delay-ms", default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Maximum number of concurrent page fetches across all sites
    #[serde(rename = "max-concurrent-pages", default = "default_max_concurrent_pages")]
    pub max_concurrent_pages: usize,
}

/// A configured site: absolute root URL (no trailing slash) and display name
#[derive(Debug, Clone, Deserialize)]
pub struct SiteEntry {
    pub url: String,
    pub name: String,
}

fn default_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_database_path() -> String {
    "./lindex.db".to_string()
}

fn default_page_delay_ms() -> u64 {
    500
}

fn default_max_concurrent_pages() -> usize {
    4
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            page_delay_ms: default_page_delay_ms(),
            max_concurrent_pages: default_max_concurrent_pages(),
        }
    }
}
