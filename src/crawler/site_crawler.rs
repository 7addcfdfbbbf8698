//! Per-site crawl job
//!
//! Recursive frontier traversal: every path spawns one task per
//! newly-discovered outbound link and joins them. Fetch concurrency is
//! bounded by a semaphore shared across all active site jobs, and each
//! worker sleeps after a fetch to cap the outbound rate per site.

use crate::analyzer::LemmaAnalyzer;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::extract_body_text;
use crate::crawler::CrawlError;
use crate::storage::{PageRecord, SiteRecord, Store};
use dashmap::DashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Shared dependencies of one crawl run
#[derive(Clone)]
pub(crate) struct CrawlContext {
    pub store: Arc<Store>,
    pub analyzer: Arc<LemmaAnalyzer>,
    pub fetcher: Arc<PageFetcher>,
    /// Process-wide running flag; a cleared flag cancels the crawl
    pub running: Arc<AtomicBool>,
    /// Bounds concurrent fetches across all site jobs
    pub limiter: Arc<Semaphore>,
    /// Sleep after each fetch
    pub page_delay: Duration,
}

/// One crawl job, owning the visited set of a single site
pub struct SiteCrawler {
    context: CrawlContext,
    site: SiteRecord,
    /// Site-relative paths ever enqueued; insertion doubles as the
    /// atomic claim that de-duplicates the frontier
    visited: DashSet<String>,
}

impl SiteCrawler {
    pub(crate) fn new(context: CrawlContext, site: SiteRecord) -> Arc<Self> {
        Arc::new(Self {
            context,
            site,
            visited: DashSet::new(),
        })
    }

    /// Crawls the site starting from its root path
    ///
    /// Returns when the frontier drains or the running flag clears.
    /// Per-path failures are logged and abandoned; they never abort the
    /// site crawl.
    pub async fn run(self: Arc<Self>) {
        self.visited.insert("/".to_string());
        self.crawl_path("/".to_string()).await;
    }

    fn crawl_path(
        self: Arc<Self>,
        path: String,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>> {
        Box::pin(async move {
            if !self.context.running.load(Ordering::SeqCst) {
                return;
            }

            let links = match self.process_path(&path).await {
                Ok(links) => links,
                Err(e) => {
                    tracing::warn!("abandoning {}{}: {}", self.site.url, path, e);
                    return;
                }
            };

            let mut children = JoinSet::new();
            for link in links {
                // Protocol-relative URLs are not site-relative
                if link.starts_with("//") {
                    continue;
                }
                if self.visited.insert(link.clone()) {
                    children.spawn(Arc::clone(&self).crawl_path(link));
                }
            }
            while children.join_next().await.is_some() {}
        })
    }

    /// Fetches and indexes one path, returning its outbound links
    async fn process_path(&self, path: &str) -> Result<Vec<String>, CrawlError> {
        // A closed semaphore means the run is being torn down
        let Ok(_permit) = self.context.limiter.acquire().await else {
            return Ok(Vec::new());
        };

        // Re-check after the possibly long wait for a permit
        if !self.context.running.load(Ordering::SeqCst) {
            return Ok(Vec::new());
        }

        let indexed = index_one_path(
            &self.context.store,
            &self.context.analyzer,
            &self.context.fetcher,
            &self.site,
            path,
        )
        .await?;

        tracing::debug!("indexed {}{}", self.site.url, path);
        tokio::time::sleep(self.context.page_delay).await;

        Ok(indexed.links)
    }
}

/// Result of indexing one path
pub(crate) struct IndexedPage {
    pub page: PageRecord,
    pub links: Vec<String>,
}

/// The per-path indexing procedure
///
/// Fetches the page, replaces any stored copy (committed before index
/// entries are written), lemmatizes the body text, writes the index
/// batch, and stamps the site's progress time. Shared by the site crawl
/// and by single-page re-indexing.
pub(crate) async fn index_one_path(
    store: &Store,
    analyzer: &LemmaAnalyzer,
    fetcher: &PageFetcher,
    site: &SiteRecord,
    path: &str,
) -> Result<IndexedPage, CrawlError> {
    let url = format!("{}{}", site.url, path);
    let fetched = fetcher.fetch(&url).await?;

    let page = store
        .upsert_page(site.id, path, fetched.code, &fetched.html)
        .await?;

    let text = extract_body_text(&fetched.html);
    let mut batch: Vec<(String, f64)> = analyzer
        .collect_lemmas(&text)
        .into_iter()
        .map(|(lemma, count)| (lemma, f64::from(count)))
        .collect();
    batch.sort_by(|a, b| a.0.cmp(&b.0));
    store.write_index_batch(&page, &batch).await?;

    store.touch_site(site.id).await?;

    Ok(IndexedPage {
        page,
        links: fetched.links,
    })
}
