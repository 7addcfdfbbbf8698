//! SQLite-backed store
//!
//! All write paths go through [`Store::with_retry`], which executes the
//! supplied closure inside a transaction and retries on lock conflicts
//! with a linearly growing delay. Read primitives run as single
//! statements outside the retry loop.

use crate::storage::schema::initialize_schema;
use crate::storage::{LemmaRecord, PageRecord, SiteRecord, SiteStatus, StoreError, StoreResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Maximum number of transaction attempts on lock conflicts
const RETRY_ATTEMPTS: u32 = 3;

/// Delay before the first retry; grows linearly with the attempt number
const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// SQLite storage backend shared by the crawler, search, and stats layers
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Opens (or creates) the database at the given path
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(Store)` - Successfully opened/created database
    /// * `Err(StoreError)` - Failed to open database
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database (for tests and ephemeral runs)
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A poisoning panic cannot leave a transaction open: the
        // transaction guard rolls back during unwind.
        match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Executes `op` inside a transaction, retrying on lock conflicts
    ///
    /// The transaction commits if `op` returns `Ok` and rolls back
    /// otherwise. Lock conflicts (`SQLITE_BUSY` / `SQLITE_LOCKED`) are
    /// retried up to [`RETRY_ATTEMPTS`] times with a delay of
    /// [`RETRY_BASE_DELAY`] × attempt number between attempts; any other
    /// failure is surfaced immediately.
    pub async fn with_retry<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: Fn(&Connection) -> rusqlite::Result<T>,
    {
        let mut attempt: u32 = 0;

        loop {
            let outcome = {
                let mut conn = self.lock();
                let tx = conn.transaction()?;
                match op(&tx) {
                    Ok(value) => tx.commit().map(|_| value),
                    // Dropping the transaction rolls it back
                    Err(e) => Err(e),
                }
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(e) if is_lock_conflict(&e) => {
                    attempt += 1;
                    if attempt >= RETRY_ATTEMPTS {
                        tracing::warn!("lock conflict persisted after {} attempts", attempt);
                        return Err(StoreError::RetriesExhausted { attempts: attempt });
                    }
                    let delay = RETRY_BASE_DELAY * attempt;
                    tracing::debug!(
                        "lock conflict, attempt {}/{}, retrying in {:?}",
                        attempt,
                        RETRY_ATTEMPTS,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(StoreError::Database(e)),
            }
        }
    }

    // ===== Site Management =====

    /// Finds a site by URL or creates it with status INDEXING
    pub async fn find_or_create_site(&self, url: &str, name: &str) -> StoreResult<SiteRecord> {
        self.with_retry(|conn| {
            if let Some(site) = site_by_url_tx(conn, url)? {
                return Ok(site);
            }

            let now = Utc::now();
            conn.execute(
                "INSERT INTO sites (url, name, status, status_time) VALUES (?1, ?2, ?3, ?4)",
                params![
                    url,
                    name,
                    SiteStatus::Indexing.to_db_string(),
                    now.to_rfc3339()
                ],
            )?;

            Ok(SiteRecord {
                id: conn.last_insert_rowid(),
                url: url.to_string(),
                name: name.to_string(),
                status: SiteStatus::Indexing,
                status_time: now,
                last_error: None,
            })
        })
        .await
    }

    /// Updates a site's status, stamping `status_time = now`
    pub async fn set_site_status(
        &self,
        site_id: i64,
        status: SiteStatus,
        error: Option<&str>,
    ) -> StoreResult<()> {
        self.with_retry(|conn| {
            conn.execute(
                "UPDATE sites SET status = ?1, last_error = ?2, status_time = ?3 WHERE id = ?4",
                params![
                    status.to_db_string(),
                    error,
                    Utc::now().to_rfc3339(),
                    site_id
                ],
            )?;
            Ok(())
        })
        .await
    }

    /// Stamps `status_time = now` as a progress signal for observers
    pub async fn touch_site(&self, site_id: i64) -> StoreResult<()> {
        self.with_retry(|conn| {
            conn.execute(
                "UPDATE sites SET status_time = ?1 WHERE id = ?2",
                params![Utc::now().to_rfc3339(), site_id],
            )?;
            Ok(())
        })
        .await
    }

    /// Transitions every INDEXING site to FAILED with the given error
    ///
    /// Returns the number of sites transitioned.
    pub async fn fail_indexing_sites(&self, error: &str) -> StoreResult<usize> {
        self.with_retry(|conn| {
            conn.execute(
                "UPDATE sites SET status = ?1, last_error = ?2, status_time = ?3
                 WHERE status = ?4",
                params![
                    SiteStatus::Failed.to_db_string(),
                    error,
                    Utc::now().to_rfc3339(),
                    SiteStatus::Indexing.to_db_string()
                ],
            )
        })
        .await
    }

    /// Removes all index entries, lemmas, and pages of a site, in that order
    pub async fn purge_site(&self, site_id: i64) -> StoreResult<()> {
        self.with_retry(|conn| {
            conn.execute(
                "DELETE FROM index_entries WHERE page_id IN
                 (SELECT id FROM pages WHERE site_id = ?1)",
                params![site_id],
            )?;
            conn.execute("DELETE FROM lemmas WHERE site_id = ?1", params![site_id])?;
            conn.execute("DELETE FROM pages WHERE site_id = ?1", params![site_id])?;
            Ok(())
        })
        .await
    }

    // ===== Page Management =====

    /// Inserts a page, replacing any existing page at (site, path)
    ///
    /// If a page already exists at this path its index entries are
    /// removed first and affected lemma frequencies are decremented, so
    /// re-indexing the same path is idempotent. The insert commits
    /// before any index entries are written for the new page.
    pub async fn upsert_page(
        &self,
        site_id: i64,
        path: &str,
        code: u16,
        html: &str,
    ) -> StoreResult<PageRecord> {
        self.with_retry(|conn| {
            if let Some(existing) = page_id_by_site_and_path_tx(conn, site_id, path)? {
                purge_page_tx(conn, existing)?;
            }

            conn.execute(
                "INSERT INTO pages (site_id, path, code, content) VALUES (?1, ?2, ?3, ?4)",
                params![site_id, path, code, html],
            )?;

            Ok(PageRecord {
                id: conn.last_insert_rowid(),
                site_id,
                path: path.to_string(),
                code,
                content: html.to_string(),
            })
        })
        .await
    }

    /// Deletes a page, its index entries, and decrements lemma frequencies
    pub async fn purge_page(&self, page_id: i64) -> StoreResult<()> {
        self.with_retry(|conn| purge_page_tx(conn, page_id)).await
    }

    // ===== Index Writing =====

    /// Writes one page's lemma occurrences to the index
    ///
    /// For each `(lemma, rank)` pair the lemma row for the page's site
    /// is created if absent, its frequency incremented by one, and an
    /// index entry inserted. Callers pass each lemma at most once per
    /// page, so a lemma's frequency grows by at most one per distinct
    /// page.
    pub async fn write_index_batch(
        &self,
        page: &PageRecord,
        entries: &[(String, f64)],
    ) -> StoreResult<()> {
        self.with_retry(|conn| {
            for (lemma, rank) in entries {
                conn.execute(
                    "INSERT INTO lemmas (site_id, lemma, frequency) VALUES (?1, ?2, 1)
                     ON CONFLICT(site_id, lemma) DO UPDATE SET frequency = frequency + 1",
                    params![page.site_id, lemma],
                )?;
                let lemma_id: i64 = conn.query_row(
                    "SELECT id FROM lemmas WHERE site_id = ?1 AND lemma = ?2",
                    params![page.site_id, lemma],
                    |row| row.get(0),
                )?;
                conn.execute(
                    "INSERT INTO index_entries (page_id, lemma_id, rank) VALUES (?1, ?2, ?3)",
                    params![page.id, lemma_id, rank],
                )?;
            }
            Ok(())
        })
        .await
    }

    // ===== Read Primitives =====

    pub fn site_by_url(&self, url: &str) -> StoreResult<Option<SiteRecord>> {
        let conn = self.lock();
        Ok(site_by_url_tx(&conn, url)?)
    }

    pub fn site_by_id(&self, site_id: i64) -> StoreResult<Option<SiteRecord>> {
        let conn = self.lock();
        let site = conn
            .query_row(
                "SELECT id, url, name, status, status_time, last_error FROM sites WHERE id = ?1",
                params![site_id],
                map_site_row,
            )
            .optional()?;
        Ok(site)
    }

    pub fn all_sites(&self) -> StoreResult<Vec<SiteRecord>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, url, name, status, status_time, last_error FROM sites ORDER BY id",
        )?;
        let sites = stmt
            .query_map([], map_site_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sites)
    }

    pub fn page_by_id(&self, page_id: i64) -> StoreResult<Option<PageRecord>> {
        let conn = self.lock();
        let page = conn
            .query_row(
                "SELECT id, site_id, path, code, content FROM pages WHERE id = ?1",
                params![page_id],
                map_page_row,
            )
            .optional()?;
        Ok(page)
    }

    pub fn page_by_site_and_path(
        &self,
        site_id: i64,
        path: &str,
    ) -> StoreResult<Option<PageRecord>> {
        let conn = self.lock();
        let page = conn
            .query_row(
                "SELECT id, site_id, path, code, content FROM pages
                 WHERE site_id = ?1 AND path = ?2",
                params![site_id, path],
                map_page_row,
            )
            .optional()?;
        Ok(page)
    }

    /// Lemma rows of one site whose text is in `texts`
    pub fn lemmas_by_site_and_texts(
        &self,
        site_id: i64,
        texts: &[String],
    ) -> StoreResult<Vec<LemmaRecord>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT id, site_id, lemma, frequency FROM lemmas
             WHERE site_id = ?1 AND lemma IN ({})",
            placeholders(texts.len(), 2)
        );
        let conn = self.lock();
        let mut stmt = conn.prepare(&sql)?;
        let mut args: Vec<&dyn rusqlite::ToSql> = vec![&site_id];
        for text in texts {
            args.push(text);
        }
        let lemmas = stmt
            .query_map(args.as_slice(), map_lemma_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lemmas)
    }

    /// Lemma rows across all sites whose text is in `texts`
    pub fn lemmas_by_texts(&self, texts: &[String]) -> StoreResult<Vec<LemmaRecord>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT id, site_id, lemma, frequency FROM lemmas WHERE lemma IN ({})",
            placeholders(texts.len(), 1)
        );
        let conn = self.lock();
        let mut stmt = conn.prepare(&sql)?;
        let lemmas = stmt
            .query_map(rusqlite::params_from_iter(texts.iter()), map_lemma_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lemmas)
    }

    /// All lemma rows of one site
    pub fn lemmas_of_site(&self, site_id: i64) -> StoreResult<Vec<LemmaRecord>> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare("SELECT id, site_id, lemma, frequency FROM lemmas WHERE site_id = ?1")?;
        let lemmas = stmt
            .query_map(params![site_id], map_lemma_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lemmas)
    }

    /// Page ids containing a lemma, in insertion (discovery) order
    pub fn pages_by_lemma(&self, lemma_id: i64) -> StoreResult<Vec<i64>> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare("SELECT page_id FROM index_entries WHERE lemma_id = ?1 ORDER BY page_id")?;
        let pages = stmt
            .query_map(params![lemma_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(pages)
    }

    /// Occurrence count of a lemma on a page, if indexed
    pub fn rank_of(&self, page_id: i64, lemma_id: i64) -> StoreResult<Option<f64>> {
        let conn = self.lock();
        let rank = conn
            .query_row(
                "SELECT rank FROM index_entries WHERE page_id = ?1 AND lemma_id = ?2",
                params![page_id, lemma_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(rank)
    }

    // ===== Counters =====

    pub fn count_sites(&self) -> StoreResult<u64> {
        self.count("SELECT COUNT(*) FROM sites", &[])
    }

    pub fn count_pages(&self) -> StoreResult<u64> {
        self.count("SELECT COUNT(*) FROM pages", &[])
    }

    pub fn count_lemmas(&self) -> StoreResult<u64> {
        self.count("SELECT COUNT(*) FROM lemmas", &[])
    }

    pub fn count_pages_of_site(&self, site_id: i64) -> StoreResult<u64> {
        self.count("SELECT COUNT(*) FROM pages WHERE site_id = ?1", &[&site_id])
    }

    pub fn count_lemmas_of_site(&self, site_id: i64) -> StoreResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM lemmas WHERE site_id = ?1",
            &[&site_id],
        )
    }

    pub fn count_index_entries_of_site(&self, site_id: i64) -> StoreResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM index_entries WHERE page_id IN
             (SELECT id FROM pages WHERE site_id = ?1)",
            &[&site_id],
        )
    }

    fn count(&self, sql: &str, args: &[&dyn rusqlite::ToSql]) -> StoreResult<u64> {
        let conn = self.lock();
        let count: i64 = conn.query_row(sql, args, |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// True for SQLite failures the retry loop should absorb
fn is_lock_conflict(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::DatabaseBusy
                || e.code == rusqlite::ErrorCode::DatabaseLocked
    )
}

fn placeholders(count: usize, first: usize) -> String {
    (0..count)
        .map(|i| format!("?{}", first + i))
        .collect::<Vec<_>>()
        .join(", ")
}

fn site_by_url_tx(conn: &Connection, url: &str) -> rusqlite::Result<Option<SiteRecord>> {
    conn.query_row(
        "SELECT id, url, name, status, status_time, last_error FROM sites WHERE url = ?1",
        params![url],
        map_site_row,
    )
    .optional()
}

fn page_id_by_site_and_path_tx(
    conn: &Connection,
    site_id: i64,
    path: &str,
) -> rusqlite::Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM pages WHERE site_id = ?1 AND path = ?2",
        params![site_id, path],
        |row| row.get(0),
    )
    .optional()
}

/// Deletes a page and its index entries, decrementing the frequency of
/// each lemma that had an entry on the page by exactly one
fn purge_page_tx(conn: &Connection, page_id: i64) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE lemmas SET frequency = frequency - 1 WHERE id IN
         (SELECT lemma_id FROM index_entries WHERE page_id = ?1)",
        params![page_id],
    )?;
    conn.execute(
        "DELETE FROM index_entries WHERE page_id = ?1",
        params![page_id],
    )?;
    conn.execute("DELETE FROM pages WHERE id = ?1", params![page_id])?;
    Ok(())
}

fn map_site_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SiteRecord> {
    let status: String = row.get(3)?;
    let status_time: String = row.get(4)?;
    Ok(SiteRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        name: row.get(2)?,
        status: SiteStatus::from_db_string(&status).unwrap_or(SiteStatus::Failed),
        status_time: DateTime::parse_from_rfc3339(&status_time)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        last_error: row.get(5)?,
    })
}

fn map_page_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PageRecord> {
    Ok(PageRecord {
        id: row.get(0)?,
        site_id: row.get(1)?,
        path: row.get(2)?,
        code: row.get::<_, i64>(3)? as u16,
        content: row.get(4)?,
    })
}

fn map_lemma_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<LemmaRecord> {
    Ok(LemmaRecord {
        id: row.get(0)?,
        site_id: row.get(1)?,
        lemma: row.get(2)?,
        frequency: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn site_with_pages(store: &Store, pages: &[(&str, &[(&str, f64)])]) -> SiteRecord {
        let site = store
            .find_or_create_site("https://example.com", "Example")
            .await
            .unwrap();
        for (path, lemmas) in pages {
            let page = store
                .upsert_page(site.id, path, 200, "<html></html>")
                .await
                .unwrap();
            let batch: Vec<(String, f64)> =
                lemmas.iter().map(|(l, r)| (l.to_string(), *r)).collect();
            store.write_index_batch(&page, &batch).await.unwrap();
        }
        site
    }

    /// Asserts that every lemma's frequency equals the number of
    /// distinct pages with an index entry for it
    fn assert_frequencies_consistent(store: &Store, site_id: i64) {
        for lemma in store.lemmas_of_site(site_id).unwrap() {
            let pages = store.pages_by_lemma(lemma.id).unwrap();
            assert_eq!(
                lemma.frequency,
                pages.len() as i64,
                "lemma '{}' frequency out of sync",
                lemma.lemma
            );
        }
    }

    #[tokio::test]
    async fn test_find_or_create_site_is_idempotent() {
        let store = Store::open_in_memory().unwrap();
        let first = store
            .find_or_create_site("https://example.com", "Example")
            .await
            .unwrap();
        let second = store
            .find_or_create_site("https://example.com", "Example")
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.count_sites().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_write_index_batch_sets_frequency_and_rank() {
        let store = Store::open_in_memory().unwrap();
        let site = site_with_pages(&store, &[("/", &[("кот", 2.0), ("собака", 1.0)])]).await;

        let lemmas = store
            .lemmas_by_site_and_texts(site.id, &["кот".to_string(), "собака".to_string()])
            .unwrap();
        assert_eq!(lemmas.len(), 2);
        for lemma in &lemmas {
            assert_eq!(lemma.frequency, 1);
        }

        let page = store.page_by_site_and_path(site.id, "/").unwrap().unwrap();
        let cat = lemmas.iter().find(|l| l.lemma == "кот").unwrap();
        assert_eq!(store.rank_of(page.id, cat.id).unwrap(), Some(2.0));
        assert_frequencies_consistent(&store, site.id);
    }

    #[tokio::test]
    async fn test_shared_lemma_counts_distinct_pages() {
        let store = Store::open_in_memory().unwrap();
        let site = site_with_pages(
            &store,
            &[
                ("/", &[("кот", 1.0)]),
                ("/a", &[("кот", 3.0), ("собака", 1.0)]),
            ],
        )
        .await;

        let lemmas = store
            .lemmas_by_site_and_texts(site.id, &["кот".to_string()])
            .unwrap();
        assert_eq!(lemmas[0].frequency, 2);
        assert_frequencies_consistent(&store, site.id);
    }

    #[tokio::test]
    async fn test_purge_page_decrements_frequencies() {
        let store = Store::open_in_memory().unwrap();
        let site = site_with_pages(
            &store,
            &[("/", &[("кот", 1.0)]), ("/a", &[("кот", 1.0)])],
        )
        .await;

        let page = store.page_by_site_and_path(site.id, "/a").unwrap().unwrap();
        store.purge_page(page.id).await.unwrap();

        assert_eq!(store.count_pages_of_site(site.id).unwrap(), 1);
        let lemmas = store
            .lemmas_by_site_and_texts(site.id, &["кот".to_string()])
            .unwrap();
        assert_eq!(lemmas[0].frequency, 1);
        assert_frequencies_consistent(&store, site.id);
    }

    #[tokio::test]
    async fn test_upsert_page_is_idempotent() {
        let store = Store::open_in_memory().unwrap();
        let site = store
            .find_or_create_site("https://example.com", "Example")
            .await
            .unwrap();

        for _ in 0..2 {
            let page = store
                .upsert_page(site.id, "/", 200, "<html>кот</html>")
                .await
                .unwrap();
            store
                .write_index_batch(&page, &[("кот".to_string(), 1.0)])
                .await
                .unwrap();
        }

        assert_eq!(store.count_pages_of_site(site.id).unwrap(), 1);
        let lemmas = store
            .lemmas_by_site_and_texts(site.id, &["кот".to_string()])
            .unwrap();
        assert_eq!(lemmas[0].frequency, 1);
        assert_eq!(store.count_index_entries_of_site(site.id).unwrap(), 1);
        assert_frequencies_consistent(&store, site.id);
    }

    #[tokio::test]
    async fn test_purge_site_cascades() {
        let store = Store::open_in_memory().unwrap();
        let site = site_with_pages(
            &store,
            &[("/", &[("кот", 1.0)]), ("/a", &[("собака", 1.0)])],
        )
        .await;

        store.purge_site(site.id).await.unwrap();

        assert_eq!(store.count_pages_of_site(site.id).unwrap(), 0);
        assert_eq!(store.count_lemmas_of_site(site.id).unwrap(), 0);
        assert_eq!(store.count_index_entries_of_site(site.id).unwrap(), 0);
        // The site row itself survives a purge
        assert_eq!(store.count_sites().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_fail_indexing_sites() {
        let store = Store::open_in_memory().unwrap();
        let site = store
            .find_or_create_site("https://example.com", "Example")
            .await
            .unwrap();
        assert_eq!(site.status, SiteStatus::Indexing);

        let transitioned = store.fail_indexing_sites("stopped by user").await.unwrap();
        assert_eq!(transitioned, 1);

        let site = store.site_by_id(site.id).unwrap().unwrap();
        assert_eq!(site.status, SiteStatus::Failed);
        assert_eq!(site.last_error.as_deref(), Some("stopped by user"));

        // Already-failed sites are not transitioned again
        assert_eq!(
            store.fail_indexing_sites("stopped by user").await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_set_site_status_stamps_time() {
        let store = Store::open_in_memory().unwrap();
        let site = store
            .find_or_create_site("https://example.com", "Example")
            .await
            .unwrap();

        store
            .set_site_status(site.id, SiteStatus::Indexed, None)
            .await
            .unwrap();

        let updated = store.site_by_id(site.id).unwrap().unwrap();
        assert_eq!(updated.status, SiteStatus::Indexed);
        assert!(updated.status_time >= site.status_time);
    }

    #[tokio::test]
    async fn test_rank_of_missing_entry() {
        let store = Store::open_in_memory().unwrap();
        site_with_pages(&store, &[("/", &[("кот", 1.0)])]).await;
        assert_eq!(store.rank_of(999, 999).unwrap(), None);
    }
}
