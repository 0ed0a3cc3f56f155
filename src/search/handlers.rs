use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::{instrument, warn};

use super::{
    client::SearchError,
    dto::{BackendSearchRequest, SearchItem, SearchParams, SearchResponse},
};
use crate::{error::AppError, state::AppState};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

pub fn search_routes() -> Router<AppState> {
    Router::new().route("/search", get(search))
}

fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|v| v.parse::<u32>().ok())
        .filter(|p| *p > 0)
        .unwrap_or(DEFAULT_PAGE)
}

fn parse_page_size(raw: Option<&str>) -> u32 {
    raw.and_then(|v| v.parse::<u32>().ok())
        .filter(|s| (1..=MAX_PAGE_SIZE).contains(s))
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

/// Url without its scheme, for display.
pub fn display_url(url: &str) -> String {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url)
        .to_string()
}

#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::InvalidPayload("Query parameter 'q' is required".into()))?;

    let req = BackendSearchRequest {
        query: query.to_string(),
        page: parse_page(params.page.as_deref()),
        page_size: parse_page_size(params.page_size.as_deref()),
    };

    let reply = match state.search.search(&req).await {
        Ok(r) => r,
        Err(SearchError::Unavailable(e)) => {
            warn!(error = %e, "search backend unavailable, answering empty");
            return Ok(Json(SearchResponse {
                query: req.query,
                results: Vec::new(),
                total: 0,
                page: req.page,
                page_size: req.page_size,
                total_pages: 0,
                message: Some("Search service temporarily unavailable"),
            }));
        }
        Err(e) => return Err(AppError::SearchFailed(e.to_string())),
    };

    let results = reply
        .results
        .into_iter()
        .map(|r| SearchItem {
            display_url: display_url(&r.url),
            title: r.title,
            url: r.url,
            snippet: r.snippet,
        })
        .collect();

    Ok(Json(SearchResponse {
        query: req.query,
        results,
        total: reply.total,
        page: reply.page,
        page_size: reply.page_size,
        total_pages: reply.total_pages,
        message: None,
    }))
}
