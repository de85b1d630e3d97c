//! TheirStack API client

use async_trait::async_trait;
use serde_json::Value;

use crate::config::jobs::API_BASE_URL;
use crate::error::{JobsApiError, Result};
use crate::jobs::types::SearchRequest;

/// Job search backend used by the tool handler
#[async_trait]
pub trait JobSearchApi: Send + Sync {
    /// Run one search and return the raw response body
    async fn search(&self, request: &SearchRequest) -> Result<Value>;
}

/// HTTP client for `POST /jobs/search`
pub struct JobStackClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl JobStackClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: API_BASE_URL.to_string(),
        }
    }

    /// Point the client at another API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn search_url(&self) -> String {
        format!("{}/jobs/search", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl JobSearchApi for JobStackClient {
    async fn search(&self, request: &SearchRequest) -> Result<Value> {
        let response = self
            .http_client
            .post(self.search_url())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Error searching jobs: {} - {}", status.as_u16(), body);
            return Err(JobsApiError::RequestFailed {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url() {
        let client = JobStackClient::new("key").with_base_url("http://localhost:9000/v1/");
        assert_eq!(client.search_url(), "http://localhost:9000/v1/jobs/search");

        let client = JobStackClient::new("key");
        assert_eq!(client.search_url(), "https://api.theirstack.com/v1/jobs/search");
    }
}
