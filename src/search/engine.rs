//! Query execution
//!
//! Implements the retrieval contract: query lemmatization, document
//! frequency filtering, page intersection from rarest lemma outward,
//! rank-sum relevance with max normalization, and stable ordering.

use crate::analyzer::LemmaAnalyzer;
use crate::crawler::{extract_body_text, extract_title};
use crate::search::snippet::build_snippet;
use crate::search::SearchError;
use crate::storage::{LemmaRecord, SiteRecord, SiteStatus, Store};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Lemmas present on more than this share of pages carry no signal
const HIGH_FREQUENCY_THRESHOLD: f64 = 0.8;

/// One search result row
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub site: String,
    pub site_name: String,
    pub uri: String,
    pub title: String,
    pub snippet: String,
    pub relevance: f64,
}

/// Search response: total match count plus the requested page window
#[derive(Debug)]
pub struct SearchOutcome {
    pub count: usize,
    pub hits: Vec<SearchHit>,
}

/// Answers ranked queries over the persisted index
pub struct SearchEngine {
    store: Arc<Store>,
    analyzer: Arc<LemmaAnalyzer>,
}

impl SearchEngine {
    pub fn new(store: Arc<Store>, analyzer: Arc<LemmaAnalyzer>) -> Self {
        Self { store, analyzer }
    }

    /// Executes a query
    ///
    /// # Arguments
    ///
    /// * `query` - free-text query, reduced to lemmas before matching
    /// * `site_url` - optional site root to scope the search to
    /// * `offset`, `limit` - pagination window over the ranked results
    pub fn search(
        &self,
        query: &str,
        site_url: Option<&str>,
        offset: usize,
        limit: usize,
    ) -> Result<SearchOutcome, SearchError> {
        let mut query_lemmas: Vec<String> =
            self.analyzer.collect_lemmas(query).into_keys().collect();
        query_lemmas.sort();
        if query_lemmas.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        // An unresolvable or not-yet-indexed site degrades to unscoped search
        let scope = self.resolve_site(site_url)?;

        let surviving = self.filter_lemmas(&query_lemmas, scope.as_ref())?;
        let (pages, site_of_page, lemmas_by_site) = self.intersect_pages(&surviving)?;
        if pages.is_empty() {
            return Err(SearchError::NoResults);
        }

        let scored = self.score_pages(&pages, &site_of_page, &lemmas_by_site)?;
        let count = scored.len();
        let hits = self.build_hits(scored, &site_of_page, &query_lemmas, offset, limit)?;

        Ok(SearchOutcome { count, hits })
    }

    fn resolve_site(&self, site_url: Option<&str>) -> Result<Option<SiteRecord>, SearchError> {
        let Some(url) = site_url.map(str::trim).filter(|u| !u.is_empty()) else {
            return Ok(None);
        };
        let site = self
            .store
            .site_by_url(url.trim_end_matches('/'))?
            .filter(|site| site.status == SiteStatus::Indexed);
        Ok(site)
    }

    /// Drops lemmas too frequent to carry signal and sorts by frequency
    ///
    /// The threshold is `0.8 × total pages` (per-site when scoped).
    /// When filtering leaves no lemma at all, the single rarest one is
    /// kept so the query still produces its best-effort answer.
    fn filter_lemmas(
        &self,
        query_lemmas: &[String],
        scope: Option<&SiteRecord>,
    ) -> Result<Vec<LemmaRecord>, SearchError> {
        let rows = match scope {
            Some(site) => self.store.lemmas_by_site_and_texts(site.id, query_lemmas)?,
            None => self.store.lemmas_by_texts(query_lemmas)?,
        };
        if rows.is_empty() {
            return Err(SearchError::NoResults);
        }

        let total_pages = match scope {
            Some(site) => self.store.count_pages_of_site(site.id)?,
            None => self.store.count_pages()?,
        };
        let threshold = (total_pages as f64 * HIGH_FREQUENCY_THRESHOLD) as i64;

        let mut surviving: Vec<LemmaRecord> = rows
            .iter()
            .filter(|lemma| lemma.frequency <= threshold)
            .cloned()
            .collect();

        if surviving.is_empty() {
            if let Some(rarest) = rows.iter().min_by_key(|lemma| lemma.frequency) {
                surviving.push(rarest.clone());
            }
        }

        surviving.sort_by_key(|lemma| lemma.frequency);
        Ok(surviving)
    }

    /// Intersects page sets per owning site, rarest lemma first
    ///
    /// Returns the union of per-site intersections, the owning site of
    /// each page, and the surviving lemmas grouped by site (used for
    /// scoring).
    #[allow(clippy::type_complexity)]
    fn intersect_pages(
        &self,
        surviving: &[LemmaRecord],
    ) -> Result<(Vec<i64>, HashMap<i64, i64>, HashMap<i64, Vec<LemmaRecord>>), SearchError> {
        let mut by_site: BTreeMap<i64, Vec<LemmaRecord>> = BTreeMap::new();
        for lemma in surviving {
            by_site.entry(lemma.site_id).or_default().push(lemma.clone());
        }

        let mut pages = Vec::new();
        let mut site_of_page = HashMap::new();
        for (site_id, lemmas) in &by_site {
            // Input is frequency-sorted, so lemmas[0] is the rarest
            let mut site_pages = self.store.pages_by_lemma(lemmas[0].id)?;
            for lemma in &lemmas[1..] {
                if site_pages.is_empty() {
                    break;
                }
                let other: HashSet<i64> =
                    self.store.pages_by_lemma(lemma.id)?.into_iter().collect();
                site_pages.retain(|page| other.contains(page));
            }
            for page in site_pages {
                site_of_page.insert(page, *site_id);
                pages.push(page);
            }
        }

        Ok((pages, site_of_page, by_site.into_iter().collect()))
    }

    /// Sums ranks per page and normalizes by the maximum
    fn score_pages(
        &self,
        pages: &[i64],
        site_of_page: &HashMap<i64, i64>,
        lemmas_by_site: &HashMap<i64, Vec<LemmaRecord>>,
    ) -> Result<Vec<(i64, f64)>, SearchError> {
        let mut scored = Vec::with_capacity(pages.len());
        let mut max_relevance = 0f64;

        for &page_id in pages {
            let mut relevance = 0f64;
            if let Some(lemmas) = site_of_page
                .get(&page_id)
                .and_then(|site_id| lemmas_by_site.get(site_id))
            {
                for lemma in lemmas {
                    relevance += self.store.rank_of(page_id, lemma.id)?.unwrap_or(0.0);
                }
            }
            if relevance > max_relevance {
                max_relevance = relevance;
            }
            scored.push((page_id, relevance));
        }

        if max_relevance > 0.0 {
            for entry in &mut scored {
                entry.1 /= max_relevance;
            }
        }

        // Stable sort: ties keep discovery order
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        Ok(scored)
    }

    fn build_hits(
        &self,
        scored: Vec<(i64, f64)>,
        site_of_page: &HashMap<i64, i64>,
        query_lemmas: &[String],
        offset: usize,
        limit: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let mut sites: HashMap<i64, SiteRecord> = HashMap::new();
        for site in self.store.all_sites()? {
            sites.insert(site.id, site);
        }

        let mut hits = Vec::new();
        for (page_id, relevance) in scored.into_iter().skip(offset).take(limit) {
            let Some(page) = self.store.page_by_id(page_id)? else {
                continue;
            };
            let Some(site) = site_of_page.get(&page_id).and_then(|id| sites.get(id)) else {
                continue;
            };

            let text = extract_body_text(&page.content);
            hits.push(SearchHit {
                site: site.url.clone(),
                site_name: site.name.clone(),
                uri: page.path.clone(),
                title: extract_title(&page.content).unwrap_or_default(),
                snippet: build_snippet(&text, query_lemmas),
                relevance,
            });
        }
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::PageRecord;

    /// Builds a store with one INDEXED site whose pages contain the
    /// given body text, indexed through the identity analyzer
    async fn indexed_site(store: &Store, url: &str, pages: &[(&str, &str)]) -> SiteRecord {
        let analyzer = LemmaAnalyzer::with_default_backends();
        let site = store.find_or_create_site(url, "Test Site").await.unwrap();
        for (path, body) in pages {
            let html = format!("<html><head><title>{}</title></head><body>{}</body></html>", path, body);
            let page = store.upsert_page(site.id, path, 200, &html).await.unwrap();
            index_body(store, &analyzer, &page, body).await;
        }
        store
            .set_site_status(site.id, SiteStatus::Indexed, None)
            .await
            .unwrap();
        store.site_by_id(site.id).unwrap().unwrap()
    }

    async fn index_body(store: &Store, analyzer: &LemmaAnalyzer, page: &PageRecord, body: &str) {
        let mut batch: Vec<(String, f64)> = analyzer
            .collect_lemmas(body)
            .into_iter()
            .map(|(lemma, count)| (lemma, f64::from(count)))
            .collect();
        batch.sort_by(|a, b| a.0.cmp(&b.0));
        store.write_index_batch(page, &batch).await.unwrap();
    }

    fn engine(store: Arc<Store>) -> SearchEngine {
        SearchEngine::new(store, Arc::new(LemmaAnalyzer::with_default_backends()))
    }

    #[tokio::test]
    async fn test_blank_query_is_rejected() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let engine = engine(store);
        let result = engine.search("   ", None, 0, 20);
        assert!(matches!(result, Err(SearchError::EmptyQuery)));
    }

    #[tokio::test]
    async fn test_single_lemma_hit() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        indexed_site(&store, "https://example.com", &[("/", "кот кот собака")]).await;

        let outcome = engine(Arc::clone(&store)).search("кот", None, 0, 20).unwrap();
        assert_eq!(outcome.count, 1);
        assert_eq!(outcome.hits.len(), 1);

        let hit = &outcome.hits[0];
        assert_eq!(hit.site, "https://example.com");
        assert_eq!(hit.uri, "/");
        assert_eq!(hit.relevance, 1.0);
        assert!(hit.snippet.contains("<b>кот</b>"));
    }

    #[tokio::test]
    async fn test_intersection_returns_pages_with_all_lemmas() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        indexed_site(
            &store,
            "https://example.com",
            &[("/a", "кот собака"), ("/b", "кот")],
        )
        .await;

        let outcome = engine(Arc::clone(&store))
            .search("кот собака", None, 0, 20)
            .unwrap();
        assert_eq!(outcome.count, 1);
        assert_eq!(outcome.hits[0].uri, "/a");
    }

    #[tokio::test]
    async fn test_high_frequency_lemma_is_dropped() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let pages: Vec<(String, String)> = (0..10)
            .map(|i| {
                let body = if i == 0 {
                    "вода лимон".to_string()
                } else {
                    "вода".to_string()
                };
                (format!("/p{}", i), body)
            })
            .collect();
        let borrowed: Vec<(&str, &str)> = pages
            .iter()
            .map(|(p, b)| (p.as_str(), b.as_str()))
            .collect();
        indexed_site(&store, "https://example.com", &borrowed).await;

        // "вода" appears on all ten pages (10 > 0.8 × 10) and is
        // filtered; only the page with "лимон" survives.
        let outcome = engine(Arc::clone(&store))
            .search("вода лимон", None, 0, 20)
            .unwrap();
        assert_eq!(outcome.count, 1);
        assert_eq!(outcome.hits[0].uri, "/p0");
    }

    #[tokio::test]
    async fn test_threshold_boundary() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        // 10 pages total: "чай" on exactly 8, "вода" on 9, "лимон" on 1
        let pages: Vec<(String, String)> = (0..10)
            .map(|i| {
                let mut body = String::new();
                if i < 9 {
                    body.push_str("вода ");
                }
                if i < 8 {
                    body.push_str("чай ");
                }
                if i == 0 {
                    body.push_str("лимон");
                }
                (format!("/p{}", i), body)
            })
            .collect();
        let borrowed: Vec<(&str, &str)> = pages
            .iter()
            .map(|(p, b)| (p.as_str(), b.as_str()))
            .collect();
        let site = indexed_site(&store, "https://example.com", &borrowed).await;
        let engine = engine(Arc::clone(&store));

        // freq == floor(0.8 × 10) == 8 is kept
        let outcome = engine
            .search("чай", Some(&site.url), 0, 20)
            .unwrap();
        assert_eq!(outcome.count, 8);

        // freq == 9 is dropped while "чай" remains
        let outcome = engine
            .search("вода чай", Some(&site.url), 0, 20)
            .unwrap();
        assert_eq!(outcome.count, 8);
    }

    #[tokio::test]
    async fn test_all_lemmas_frequent_keeps_rarest_when_scoped() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        // Both lemmas exceed the threshold; the rarest one is kept
        let pages: Vec<(String, String)> = (0..10)
            .map(|i| {
                let body = if i < 9 { "вода чай" } else { "вода" };
                (format!("/p{}", i), body.to_string())
            })
            .collect();
        let borrowed: Vec<(&str, &str)> = pages
            .iter()
            .map(|(p, b)| (p.as_str(), b.as_str()))
            .collect();
        let site = indexed_site(&store, "https://example.com", &borrowed).await;

        let outcome = engine(Arc::clone(&store))
            .search("вода чай", Some(&site.url), 0, 20)
            .unwrap();
        // "чай" (frequency 9) is rarer than "вода" (frequency 10)
        assert_eq!(outcome.count, 9);
    }

    #[tokio::test]
    async fn test_relevance_normalization_and_ordering() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        indexed_site(
            &store,
            "https://example.com",
            &[("/rich", "кот кот кот"), ("/poor", "кот")],
        )
        .await;

        let outcome = engine(Arc::clone(&store)).search("кот", None, 0, 20).unwrap();
        assert_eq!(outcome.count, 2);
        assert_eq!(outcome.hits[0].uri, "/rich");
        assert_eq!(outcome.hits[0].relevance, 1.0);
        assert!((outcome.hits[1].relevance - 1.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_pagination_window() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let pages: Vec<(String, String)> = (0..5)
            .map(|i| (format!("/p{}", i), "кот".to_string()))
            .collect();
        let borrowed: Vec<(&str, &str)> = pages
            .iter()
            .map(|(p, b)| (p.as_str(), b.as_str()))
            .collect();
        indexed_site(&store, "https://example.com", &borrowed).await;

        let outcome = engine(Arc::clone(&store)).search("кот", None, 2, 2).unwrap();
        assert_eq!(outcome.count, 5);
        assert_eq!(outcome.hits.len(), 2);
        // Equal relevance: discovery order is preserved
        assert_eq!(outcome.hits[0].uri, "/p2");
        assert_eq!(outcome.hits[1].uri, "/p3");
    }

    #[tokio::test]
    async fn test_unknown_lemma_yields_no_results() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        indexed_site(&store, "https://example.com", &[("/", "кот")]).await;

        let result = engine(Arc::clone(&store)).search("слон", None, 0, 20);
        assert!(matches!(result, Err(SearchError::NoResults)));
    }

    #[tokio::test]
    async fn test_unindexed_scope_degrades_to_global() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let site = indexed_site(&store, "https://example.com", &[("/", "кот")]).await;
        store
            .set_site_status(site.id, SiteStatus::Indexing, None)
            .await
            .unwrap();

        // The scoped site is not INDEXED; the search still answers
        let outcome = engine(Arc::clone(&store))
            .search("кот", Some("https://example.com"), 0, 20)
            .unwrap();
        assert_eq!(outcome.count, 1);
    }

    #[tokio::test]
    async fn test_unscoped_search_spans_sites() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        indexed_site(&store, "https://a.example.com", &[("/", "кот")]).await;
        indexed_site(&store, "https://b.example.com", &[("/", "кот")]).await;

        let outcome = engine(Arc::clone(&store)).search("кот", None, 0, 20).unwrap();
        assert_eq!(outcome.count, 2);

        let scoped = engine(Arc::clone(&store))
            .search("кот", Some("https://b.example.com"), 0, 20)
            .unwrap();
        assert_eq!(scoped.count, 1);
        assert_eq!(scoped.hits[0].site, "https://b.example.com");
    }
}
