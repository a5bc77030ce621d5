//! [`PageFetcher`] backed by an HTTP endpoint.

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use pagedquery_core::query::{FetchParams, FetchResult, PageFetcher, PaginatedResponse};

use crate::error::{ClientError, Result};

/// Fetches pages with `GET {base_url}{path}?page=..&limit=..`.
///
/// The endpoint must answer with `{"data": [...], "pagination": {"totalItems": n, "totalPages": n}}`.
#[derive(Debug)]
pub struct HttpPageFetcher<T> {
    client: reqwest::Client,
    base_url: String,
    path: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for HttpPageFetcher<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            path: self.path.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> HttpPageFetcher<T> {
    /// Create a new fetcher for the endpoint at `base_url` + `path`.
    pub fn new(base_url: impl Into<String>, path: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, path)
    }

    /// Create a fetcher reusing an existing HTTP client.
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            path: path.into(),
            _marker: PhantomData,
        }
    }

    /// Create from environment (PAGEDQUERY_URL or default).
    pub fn from_env(path: impl Into<String>) -> Self {
        let base_url =
            std::env::var("PAGEDQUERY_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
        Self::new(base_url, path)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }
}

impl<T: DeserializeOwned> HttpPageFetcher<T> {
    async fn get_page(&self, params: &FetchParams) -> Result<PaginatedResponse<T>> {
        let response = self
            .client
            .get(self.url())
            .query(&params.to_query_pairs())
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Handle error responses.
    async fn handle_response(&self, response: reqwest::Response) -> Result<PaginatedResponse<T>> {
        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(ClientError::from)
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(ClientError::ServerError {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl<T> PageFetcher<T> for HttpPageFetcher<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch(&self, params: FetchParams) -> FetchResult<PaginatedResponse<T>> {
        tracing::debug!(
            url = %self.url(),
            page = params.page,
            limit = params.limit,
            "Fetching page over HTTP"
        );
        self.get_page(&params).await.map_err(|err| {
            tracing::warn!(error = %err, "HTTP page fetch failed");
            err.into()
        })
    }
}
