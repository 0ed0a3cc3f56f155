use anyhow::Context;
use axum::async_trait;
use reqwest::StatusCode;
use tracing::{debug, warn};

use super::dto::{BackendSearchRequest, BackendSearchResponse};
use crate::config::SearchConfig;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    #[error("search backend unreachable: {0}")]
    Unavailable(String),
    #[error("search backend returned status {0}")]
    Status(u16),
    #[error("search backend reply undecodable: {0}")]
    Decode(String),
}

/// The external ranking service. Opaque apart from its request/reply shape.
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, req: &BackendSearchRequest) -> Result<BackendSearchResponse, SearchError>;
}

#[derive(Clone)]
pub struct HttpSearchClient {
    http: reqwest::Client,
    url: String,
}

impl HttpSearchClient {
    pub fn new(cfg: &SearchConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout())
            .build()
            .context("build search http client")?;
        Ok(Self {
            http,
            url: cfg.api_url.clone(),
        })
    }
}

#[async_trait]
impl SearchClient for HttpSearchClient {
    async fn search(&self, req: &BackendSearchRequest) -> Result<BackendSearchResponse, SearchError> {
        let res = self
            .http
            .post(&self.url)
            .json(req)
            .send()
            .await
            .map_err(|e| SearchError::Unavailable(e.to_string()))?;

        let status = res.status();
        if status != StatusCode::OK {
            let body = res.text().await.unwrap_or_default();
            warn!(%status, body = %body, "search backend error");
            return Err(SearchError::Status(status.as_u16()));
        }

        let parsed = res
            .json::<BackendSearchResponse>()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))?;
        debug!(
            total = parsed.total,
            page = parsed.page,
            page_size = parsed.page_size,
            total_pages = parsed.total_pages,
            "search backend replied"
        );
        Ok(parsed)
    }
}
