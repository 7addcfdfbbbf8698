//! Read-only statistics aggregation for observers

use crate::storage::{Store, StoreError};
use serde::Serialize;

/// Aggregate counters across all sites
#[derive(Debug, Clone, Serialize)]
pub struct TotalStatistics {
    pub sites: u64,
    pub pages: u64,
    pub lemmas: u64,
    pub indexing: bool,
}

/// Per-site statistics row
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedStatisticsItem {
    pub url: String,
    pub name: String,
    pub status: String,
    /// Epoch seconds of the last status change or progress stamp
    pub status_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub pages: u64,
    pub lemmas: u64,
}

/// Full statistics payload
#[derive(Debug, Clone, Serialize)]
pub struct StatisticsData {
    pub total: TotalStatistics,
    pub detailed: Vec<DetailedStatisticsItem>,
}

/// Loads statistics from the store
///
/// # Arguments
///
/// * `store` - The store to query
/// * `indexing_running` - Current state of the coordinator's running flag
pub fn collect_statistics(
    store: &Store,
    indexing_running: bool,
) -> Result<StatisticsData, StoreError> {
    let total = TotalStatistics {
        sites: store.count_sites()?,
        pages: store.count_pages()?,
        lemmas: store.count_lemmas()?,
        indexing: indexing_running,
    };

    let mut detailed = Vec::new();
    for site in store.all_sites()? {
        detailed.push(DetailedStatisticsItem {
            url: site.url.clone(),
            name: site.name.clone(),
            status: site.status.to_db_string().to_string(),
            status_time: site.status_time.timestamp(),
            error: site.last_error.clone(),
            pages: store.count_pages_of_site(site.id)?,
            lemmas: store.count_lemmas_of_site(site.id)?,
        });
    }

    Ok(StatisticsData { total, detailed })
}
