use crate::config::Config;
use crate::error::{GitHubMetricsError, Result};
use crate::types::{GitHubOrganization, GitHubRepository};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const USER_AGENT: &str = "org-profile-metrics/0.1.0";
const ACCEPT_HEADER: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
const LOW_RATE_LIMIT: u32 = 10;

/// The two GitHub endpoints the aggregator reads from.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// `GET /orgs/{org}`
    async fn fetch_organization(&self, org: &str) -> Result<GitHubOrganization>;

    /// One page of `GET /orgs/{org}/repos`, every visibility type, most recently updated first.
    async fn fetch_repositories_page(
        &self,
        org: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<GitHubRepository>>;
}

pub struct GitHubClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(GitHubClient {
            client,
            base_url: config.api_base_url.clone(),
            token: config.token.clone(),
        })
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    async fn make_request(&self, url: Url) -> Result<Response> {
        let mut request = self
            .client
            .get(url.clone())
            .header(ACCEPT, ACCEPT_HEADER)
            .header("X-GitHub-Api-Version", API_VERSION);

        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await?;

        let rate_limit_remaining = header_value::<u32>(&response, "X-RateLimit-Remaining");
        let rate_limit_reset = header_value::<i64>(&response, "X-RateLimit-Reset");

        if let Some(remaining) = rate_limit_remaining {
            debug!(remaining, %url, "GitHub rate limit");
        }

        let status = response.status();
        if status.is_success() {
            if let Some(remaining) = rate_limit_remaining.filter(|r| *r < LOW_RATE_LIMIT) {
                warn!(remaining, "GitHub rate limit running low");
            }
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();

        match status {
            StatusCode::NOT_FOUND => {
                Err(GitHubMetricsError::NotFound(format!("{}: {}", url, error_text)))
            }
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
                if rate_limit_remaining == Some(0) =>
            {
                let reset = rate_limit_reset
                    .and_then(|ts| DateTime::from_timestamp(ts, 0))
                    .map(|dt| dt.to_rfc3339())
                    .unwrap_or_else(|| "unknown".to_string());
                Err(GitHubMetricsError::RateLimitExceeded(format!(
                    "reset at {}: {}",
                    reset, error_text
                )))
            }
            status => Err(GitHubMetricsError::ApiError(format!(
                "API request failed with status {}: {}",
                status, error_text
            ))),
        }
    }

    fn organization_url(&self, org: &str) -> Result<Url> {
        Ok(self.base_url.join(&format!("orgs/{}", org))?)
    }

    fn repositories_url(&self, org: &str, page: u32, per_page: u32) -> Result<Url> {
        let mut url = self.base_url.join(&format!("orgs/{}/repos", org))?;
        url.query_pairs_mut()
            .append_pair("per_page", &per_page.to_string())
            .append_pair("page", &page.to_string())
            .append_pair("type", "all")
            .append_pair("sort", "updated");
        Ok(url)
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn fetch_organization(&self, org: &str) -> Result<GitHubOrganization> {
        let url = self.organization_url(org)?;
        let response = self.make_request(url).await?;
        let organization: GitHubOrganization = response.json().await?;
        Ok(organization)
    }

    async fn fetch_repositories_page(
        &self,
        org: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<GitHubRepository>> {
        let url = self.repositories_url(org, page, per_page)?;
        let response = self.make_request(url).await?;
        let repos: Vec<GitHubRepository> = response.json().await?;
        debug!(org, page, count = repos.len(), "Fetched repository page");
        Ok(repos)
    }
}

fn header_value<T: std::str::FromStr>(response: &Response, name: &str) -> Option<T> {
    response
        .headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse::<T>().ok())
}
