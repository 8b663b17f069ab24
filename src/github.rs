//! # GitHub Listing Client Module
//!
//! ## Purpose
//! Interfaces with the GitHub REST API to fetch the public repositories of a
//! configured account. Provides the projection of upstream records served by
//! the repository cache service.
//!
//! ## Input/Output Specification
//! - **Input**: Account name, pagination/sort parameters from configuration
//! - **Output**: Repository records sorted by `updated_at` descending
//! - **Failure modes**: network errors, non-2xx statuses, malformed bodies
//!
//! ## Key Features
//! - Single bounded-timeout request per fetch, no retries
//! - Field defaults applied when the upstream omits values
//! - Local re-sort so ordering never depends on upstream behavior

use crate::config::GithubConfig;
use crate::errors::{GatewayError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Projection of an upstream repository record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Repository name
    #[serde(default)]
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Web URL of the repository
    #[serde(default)]
    pub html_url: String,
    /// Primary language
    #[serde(default)]
    pub language: Option<String>,
    /// Star count
    #[serde(default)]
    pub stargazers_count: i64,
    /// Last update timestamp (RFC 3339 string as returned by the upstream)
    #[serde(default)]
    pub updated_at: String,
}

/// Client for the GitHub listing upstream
pub struct GithubClient {
    config: GithubConfig,
    client: Client,
}

impl GithubClient {
    /// Create a new client with the configured timeout
    pub fn new(config: GithubConfig) -> Result<Self> {
        // GitHub rejects requests without a User-Agent
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_seconds))
            .user_agent("portfolio-gateway/0.1")
            .build()
            .map_err(|e| GatewayError::Network {
                details: e.to_string(),
            })?;

        Ok(Self { config, client })
    }

    /// Fetch the public repositories of `user`, newest first.
    ///
    /// Issues exactly one request; callers own retry and fallback policy.
    pub async fn fetch_user_repos(&self, user: &str) -> Result<Vec<Repository>> {
        let url = format!("{}/users/{}/repos", self.config.api_url, user);

        debug!("Fetching repositories from: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("sort", "updated".to_string()),
                ("per_page", self.config.page_size.to_string()),
            ])
            .send()
            .await
            .map_err(|e| GatewayError::Network {
                details: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(GatewayError::UpstreamStatus {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let mut repos: Vec<Repository> =
            response.json().await.map_err(|e| GatewayError::DataParsing {
                origin: "GitHub API".to_string(),
                details: e.to_string(),
            })?;

        // Sort locally; the upstream sort parameter is advisory
        repos.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        Ok(repos)
    }
}
