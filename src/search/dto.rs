use serde::{Deserialize, Serialize};

/// Query string accepted by `GET /search`. Numbers stay strings so that
/// junk values fall back to defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// Body sent to the search backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendSearchRequest {
    pub query: String,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendSearchResult {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub snippet: String,
}

/// Paginated reply from the search backend.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendSearchResponse {
    #[serde(default)]
    pub results: Vec<BackendSearchResult>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

#[derive(Debug, Serialize)]
pub struct SearchItem {
    pub title: String,
    pub url: String,
    #[serde(rename = "displayUrl")]
    pub display_url: String,
    pub snippet: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchItem>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}
