//! Web search capability: Tavily search API, flattened into a short text digest.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::SearchError;

/// Upper bound on snippets handed back to the model.
pub const MAX_SEARCH_RESULTS: usize = 3;

/// Search capability consumed by the tool dispatcher.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Ranked `"title: snippet"` entries separated by blank lines.
    async fn search(&self, query: &str) -> Result<String, SearchError>;
}

#[derive(Debug, Deserialize)]
struct TavilySearchResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TavilySearchClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    max_results: usize,
    search_depth: String,
}

impl TavilySearchClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            max_results: MAX_SEARCH_RESULTS,
            search_depth: "basic".to_string(),
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.clamp(1, MAX_SEARCH_RESULTS);
        self
    }

    pub fn with_search_depth(mut self, search_depth: impl Into<String>) -> Self {
        self.search_depth = search_depth.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        match reqwest::Client::builder().timeout(timeout).build() {
            Ok(client) => self.client = client,
            Err(error) => {
                tracing::warn!(error = %error, "failed to build timed search http client; keeping default");
            }
        }
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl SearchBackend for TavilySearchClient {
    async fn search(&self, query: &str) -> Result<String, SearchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SearchError::NotConfigured("missing TAVILY_API_KEY".to_string()))?;
        let body = serde_json::json!({
            "query": query,
            "max_results": self.max_results,
            "search_depth": self.search_depth,
            "include_answer": false,
            "include_raw_content": false,
        });
        tracing::info!(query, "web search requested");
        let resp = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {api_key}"))
            .json(&body)
            .send()
            .await
            .map_err(|error| SearchError::Transport(error.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
            });
        }
        let parsed: TavilySearchResponse = resp
            .json()
            .await
            .map_err(|error| SearchError::MalformedResponse(error.to_string()))?;
        let digest = format_results(&parsed.results, self.max_results);
        tracing::info!(query, results = parsed.results.len().min(self.max_results), "web search completed");
        Ok(digest)
    }
}

fn format_results(results: &[TavilyResult], limit: usize) -> String {
    results
        .iter()
        .take(limit)
        .map(|result| {
            format!(
                "{}: {}",
                result.title.as_deref().unwrap_or_default().trim(),
                result.content.as_deref().unwrap_or_default().trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(title: &str, content: &str) -> TavilyResult {
        TavilyResult {
            title: Some(title.to_string()),
            content: Some(content.to_string()),
        }
    }

    #[test]
    fn results_are_truncated_and_joined_in_rank_order() {
        let results = vec![
            result("A", "first"),
            result("B", "second"),
            result("C", "third"),
            result("D", "fourth"),
        ];
        assert_eq!(
            format_results(&results, 3),
            "A: first\n\nB: second\n\nC: third"
        );
    }

    #[test]
    fn max_results_is_clamped_to_three() {
        let client = TavilySearchClient::new("http://localhost", Some("k".to_string()))
            .with_max_results(10);
        assert_eq!(client.max_results, MAX_SEARCH_RESULTS);
        let client = TavilySearchClient::new("http://localhost", None).with_max_results(0);
        assert_eq!(client.max_results, 1);
        assert!(!client.is_configured());
    }
}
