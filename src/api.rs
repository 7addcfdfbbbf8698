//! HTTP request surface
//!
//! Five synchronous endpoints under `/api`. Handlers are thin: extract
//! parameters, call one layer, map the outcome to the response JSON.
//! Failures are reported as `{result: false, error}` with HTTP 200,
//! never as protocol-level errors.

use crate::analyzer::LemmaAnalyzer;
use crate::crawler::IndexingCoordinator;
use crate::search::{SearchEngine, SearchHit};
use crate::stats::{collect_statistics, StatisticsData};
use crate::storage::Store;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub coordinator: Arc<IndexingCoordinator>,
    pub engine: Arc<SearchEngine>,
}

impl AppState {
    pub fn new(store: Arc<Store>, coordinator: Arc<IndexingCoordinator>) -> Self {
        let analyzer = Arc::new(LemmaAnalyzer::with_default_backends());
        let engine = Arc::new(SearchEngine::new(Arc::clone(&store), analyzer));
        Self {
            store,
            coordinator,
            engine,
        }
    }
}

/// Builds the API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/statistics", get(statistics))
        .route("/api/startIndexing", get(start_indexing))
        .route("/api/stopIndexing", get(stop_indexing))
        .route("/api/indexPage", post(index_page))
        .route("/api/search", get(search))
        .with_state(state)
}

#[derive(Serialize)]
struct StatisticsResponse {
    result: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    statistics: Option<StatisticsData>,
}

async fn statistics(State(state): State<AppState>) -> Json<StatisticsResponse> {
    match collect_statistics(&state.store, state.coordinator.is_running()) {
        Ok(data) => Json(StatisticsResponse {
            result: true,
            statistics: Some(data),
        }),
        Err(e) => {
            tracing::error!("statistics failed: {}", e);
            Json(StatisticsResponse {
                result: false,
                statistics: None,
            })
        }
    }
}

async fn start_indexing(State(state): State<AppState>) -> Json<Value> {
    if state.coordinator.start_indexing() {
        Json(json!({ "result": true }))
    } else {
        Json(json!({ "result": false, "error": "already running" }))
    }
}

async fn stop_indexing(State(state): State<AppState>) -> Json<Value> {
    if state.coordinator.stop_indexing().await {
        Json(json!({ "result": true }))
    } else {
        Json(json!({ "result": false, "error": "not running" }))
    }
}

#[derive(Deserialize)]
struct IndexPageParams {
    url: String,
}

async fn index_page(
    State(state): State<AppState>,
    Form(params): Form<IndexPageParams>,
) -> Json<Value> {
    match state.coordinator.index_page(params.url.trim()).await {
        Ok(()) => Json(json!({ "result": true })),
        Err(e) => Json(json!({ "result": false, "error": e.to_string() })),
    }
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    query: String,
    site: Option<String>,
    #[serde(default)]
    offset: usize,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    20
}

#[derive(Serialize)]
struct SearchResponse {
    result: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Vec<SearchHitDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchHitDto {
    site: String,
    site_name: String,
    uri: String,
    title: String,
    snippet: String,
    relevance: f64,
}

impl From<SearchHit> for SearchHitDto {
    fn from(hit: SearchHit) -> Self {
        Self {
            site: hit.site,
            site_name: hit.site_name,
            uri: hit.uri,
            title: hit.title,
            snippet: hit.snippet,
            relevance: hit.relevance,
        }
    }
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    match state.engine.search(
        &params.query,
        params.site.as_deref(),
        params.offset,
        params.limit,
    ) {
        Ok(outcome) => Json(SearchResponse {
            result: true,
            count: Some(outcome.count),
            data: Some(outcome.hits.into_iter().map(SearchHitDto::from).collect()),
            error: None,
        }),
        Err(e) => Json(SearchResponse {
            result: false,
            count: None,
            data: None,
            error: Some(e.to_string()),
        }),
    }
}
