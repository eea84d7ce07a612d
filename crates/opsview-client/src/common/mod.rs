//! Common utilities for the Opsview API client
//!
//! Provides the authenticated HTTP wrapper shared by every endpoint.

pub mod query;

use crate::error::OpsviewError;
use crate::models::ListResponse;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

/// Normalize a user-supplied endpoint to the server root.
///
/// Trailing slashes and an optional `/rest` suffix are stripped, so
/// `https://opsview.example.com/rest/` and `https://opsview.example.com` are equivalent.
pub fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    trimmed
        .strip_suffix("/rest")
        .unwrap_or(trimmed)
        .trim_end_matches('/')
        .to_string()
}

/// HTTP client wrapper with authentication
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    username: String,
    token: String,
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    pub fn new(client: Client, base_url: &str, username: String, token: String) -> Self {
        Self {
            client,
            base_url: normalize_endpoint(base_url),
            username,
            token,
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from a path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("X-Opsview-Username", &self.username)
            .header("X-Opsview-Token", &self.token)
            .header("Accept", "application/json")
    }

    /// Map a non-success response to the matching error variant
    async fn check_status(method: &str, path: &str, response: Response) -> Result<Response, OpsviewError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                OpsviewError::Authentication(format!("{method} {path}: {status} - {body}"))
            }
            StatusCode::NOT_FOUND => {
                OpsviewError::NotFound(format!("Resource not found: {path} - {body}"))
            }
            _ => OpsviewError::Api(format!("{method} {path} failed: {status} - {body}")),
        })
    }

    /// Decode a JSON body, keeping a prefix of the raw text for diagnosis
    async fn decode<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, OpsviewError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            OpsviewError::Api(format!(
                "error decoding response body: {} - Response (first 500 chars): {}",
                e,
                text.chars().take(500).collect::<String>()
            ))
        })
    }

    /// Make a GET request
    pub async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, OpsviewError> {
        let url = self.build_url(path);
        debug!("GET {}", url);

        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = Self::check_status("GET", path, response).await?;
        Self::decode(response).await
    }

    /// Make a POST request
    pub async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, OpsviewError> {
        let url = self.build_url(path);
        debug!("POST {} with body: {}", url, body);

        let response = self
            .authorized(self.client.post(&url))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;
        let response = Self::check_status("POST", path, response).await?;
        Self::decode(response).await
    }

    /// Make a PUT request
    ///
    /// Opsview treats PUT on a config object as a merge: fields absent from the body are kept.
    pub async fn put<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, OpsviewError> {
        let url = self.build_url(path);
        debug!("PUT {} with body: {}", url, body);

        let response = self
            .authorized(self.client.put(&url))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;
        let response = Self::check_status("PUT", path, response).await?;
        Self::decode(response).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Result<(), OpsviewError> {
        let url = self.build_url(path);
        debug!("DELETE {}", url);

        let response = self.authorized(self.client.delete(&url)).send().await?;
        Self::check_status("DELETE", path, response).await?;
        Ok(())
    }

    /// Fetch every page of a list endpoint.
    ///
    /// `path` must not carry a `page` parameter; it is appended per request.
    pub async fn fetch_all_pages<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<Vec<T>, OpsviewError> {
        let separator = if path.contains('?') { '&' } else { '?' };
        let mut all_results = Vec::new();
        let mut page = 1_u64;

        loop {
            let page_path = format!("{path}{separator}page={page}");
            debug!("Fetching page: {}", page_path);

            let response: ListResponse<T> = self.get(&page_path).await?;
            all_results.extend(response.list);

            match response.summary.totalpages {
                Some(total) if page < total => page += 1,
                _ => break,
            }
        }

        Ok(all_results)
    }

    /// Build query string from filters
    pub fn build_query_string(&self, filters: &[(&str, &str)]) -> String {
        filters
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}
