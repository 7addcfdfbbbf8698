//! Indexing lifecycle coordination
//!
//! Process-wide state for the crawl pipeline: the atomic running flag,
//! the handles of live site jobs, and single-page re-indexing. One
//! coordinator exists per process; request handlers call into it.

use crate::analyzer::LemmaAnalyzer;
use crate::config::{Config, SiteEntry};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::site_crawler::{index_one_path, CrawlContext, SiteCrawler};
use crate::crawler::CrawlError;
use crate::storage::{SiteStatus, Store, StoreError};
use crate::LindexError;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// How long `stop_indexing` waits for site jobs before aborting them
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Error message recorded on sites whose crawl was cancelled
const STOPPED_BY_USER: &str = "stopped by user";

/// Failure re-indexing a single page on demand
#[derive(Debug, Error)]
pub enum IndexPageError {
    #[error("page not in configured sites")]
    NotConfigured,

    #[error(transparent)]
    Crawl(#[from] CrawlError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Process-wide crawl lifecycle
pub struct IndexingCoordinator {
    store: Arc<Store>,
    analyzer: Arc<LemmaAnalyzer>,
    fetcher: Arc<PageFetcher>,
    sites: Vec<SiteEntry>,
    page_delay: Duration,
    max_concurrent_pages: usize,
    running: Arc<AtomicBool>,
    active_jobs: Arc<AtomicUsize>,
    jobs: Mutex<Vec<JoinHandle<()>>>,
}

impl IndexingCoordinator {
    pub fn new(
        store: Arc<Store>,
        analyzer: Arc<LemmaAnalyzer>,
        fetcher: Arc<PageFetcher>,
        config: &Config,
    ) -> Self {
        Self {
            store,
            analyzer,
            fetcher,
            sites: config.sites.clone(),
            page_delay: Duration::from_millis(config.indexing.page_delay_ms),
            max_concurrent_pages: config.indexing.max_concurrent_pages,
            running: Arc::new(AtomicBool::new(false)),
            active_jobs: Arc::new(AtomicUsize::new(0)),
            jobs: Mutex::new(Vec::new()),
        }
    }

    /// Whether a crawl run is currently live
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Starts one crawl job per configured site
    ///
    /// Returns `false` without side effects when a run is already live.
    /// The running flag clears itself when the last site job finishes,
    /// so completed runs can be restarted without an explicit stop.
    pub fn start_indexing(&self) -> bool {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!("indexing already running");
            return false;
        }

        if self.sites.is_empty() {
            tracing::warn!("no sites configured, nothing to index");
            self.running.store(false, Ordering::SeqCst);
            return true;
        }

        self.active_jobs.store(self.sites.len(), Ordering::SeqCst);
        let limiter = Arc::new(Semaphore::new(self.max_concurrent_pages));

        let mut jobs = self.lock_jobs();
        jobs.clear();
        for entry in &self.sites {
            let context = CrawlContext {
                store: Arc::clone(&self.store),
                analyzer: Arc::clone(&self.analyzer),
                fetcher: Arc::clone(&self.fetcher),
                running: Arc::clone(&self.running),
                limiter: Arc::clone(&limiter),
                page_delay: self.page_delay,
            };
            jobs.push(tokio::spawn(run_site_job(
                context,
                entry.clone(),
                Arc::clone(&self.active_jobs),
            )));
        }

        tracing::info!("indexing started for {} sites", self.sites.len());
        true
    }

    /// Cancels the live crawl run
    ///
    /// Clears the running flag, waits up to [`SHUTDOWN_GRACE`] for the
    /// site jobs, aborts stragglers, and transitions every site still
    /// INDEXING to FAILED. Returns `false` when no run is live.
    pub async fn stop_indexing(&self) -> bool {
        if !self.running.swap(false, Ordering::SeqCst) {
            tracing::warn!("no active indexing to stop");
            return false;
        }

        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.lock_jobs());
        let deadline = tokio::time::Instant::now() + SHUTDOWN_GRACE;
        for mut handle in handles {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if tokio::time::timeout(remaining, &mut handle).await.is_err() {
                handle.abort();
            }
        }

        match self.store.fail_indexing_sites(STOPPED_BY_USER).await {
            Ok(count) if count > 0 => {
                tracing::info!("marked {} interrupted sites as failed", count)
            }
            Ok(_) => {}
            Err(e) => tracing::error!("failed to mark interrupted sites: {}", e),
        }

        tracing::info!("indexing stopped by user");
        true
    }

    /// Re-indexes a single page on demand
    ///
    /// The URL must belong to a configured site. Runs independently of
    /// the running flag, so it works while a crawl is live or idle.
    pub async fn index_page(&self, url: &str) -> Result<(), IndexPageError> {
        let Some(entry) = self.sites.iter().find(|s| url.starts_with(&s.url)) else {
            tracing::warn!("page not in configured sites: {}", url);
            return Err(IndexPageError::NotConfigured);
        };

        let path_part = &url[entry.url.len()..];
        let path = if path_part.is_empty() { "/" } else { path_part };
        if !path.starts_with('/') {
            return Err(IndexPageError::NotConfigured);
        }

        let site = self.store.find_or_create_site(&entry.url, &entry.name).await?;
        let indexed =
            index_one_path(&self.store, &self.analyzer, &self.fetcher, &site, path).await?;

        tracing::info!("re-indexed page {} (page id {})", url, indexed.page.id);
        Ok(())
    }

    fn lock_jobs(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        match self.jobs.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Drives one site from (re)creation to its terminal status
async fn run_site_job(context: CrawlContext, entry: SiteEntry, active_jobs: Arc<AtomicUsize>) {
    if let Err(e) = drive_site(&context, &entry).await {
        tracing::error!("site crawl failed for {}: {}", entry.url, e);
        mark_site_failed(&context.store, &entry.url, &e.to_string()).await;
    }

    // Last job down clears the flag so a finished run can be restarted
    if active_jobs.fetch_sub(1, Ordering::SeqCst) == 1 {
        let _ = context
            .running
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst);
        tracing::info!("all site crawls finished");
    }
}

async fn drive_site(context: &CrawlContext, entry: &SiteEntry) -> Result<(), LindexError> {
    let site = context
        .store
        .find_or_create_site(&entry.url, &entry.name)
        .await?;
    context
        .store
        .set_site_status(site.id, SiteStatus::Indexing, None)
        .await?;
    context.store.purge_site(site.id).await?;

    tracing::info!("started indexing site {}", entry.url);
    SiteCrawler::new(context.clone(), site.clone()).run().await;

    // A cancelled run leaves the site INDEXING; stop_indexing sweeps it
    // to FAILED in its own transaction.
    if context.running.load(Ordering::SeqCst) {
        context
            .store
            .set_site_status(site.id, SiteStatus::Indexed, None)
            .await?;
        tracing::info!("site indexed: {}", entry.url);
    }

    Ok(())
}

async fn mark_site_failed(store: &Store, url: &str, reason: &str) {
    let site = match store.site_by_url(url) {
        Ok(Some(site)) => site,
        Ok(None) => return,
        Err(e) => {
            tracing::error!("could not look up site {}: {}", url, e);
            return;
        }
    };
    if let Err(e) = store
        .set_site_status(site.id, SiteStatus::Failed, Some(reason))
        .await
    {
        tracing::error!("could not mark site {} failed: {}", url, e);
    }
}
