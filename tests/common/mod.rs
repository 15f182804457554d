#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use org_profile_metrics::config::Config;
use org_profile_metrics::error::{GitHubMetricsError, Result};
use org_profile_metrics::github::GitHubApi;
use org_profile_metrics::types::{GitHubOrganization, GitHubRepository};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

pub const TEST_ORG: &str = "test-org";

pub fn repo(name: &str, pushed_at: Option<&str>, stars: Option<u64>, forks: Option<u64>) -> GitHubRepository {
    GitHubRepository {
        name: name.to_string(),
        html_url: format!("https://github.com/{}/{}", TEST_ORG, name),
        pushed_at: pushed_at.map(|ts| ts.parse().expect("valid timestamp")),
        stargazers_count: stars,
        forks_count: forks,
    }
}

/// `count` repositories with one star and one fork each
pub fn repo_page(prefix: &str, count: usize) -> Vec<GitHubRepository> {
    (0..count)
        .map(|i| repo(&format!("{}-{}", prefix, i), Some("2024-01-01T00:00:00Z"), Some(1), Some(1)))
        .collect()
}

pub fn organization(public: Option<u64>, private: Option<u64>) -> GitHubOrganization {
    GitHubOrganization {
        public_repos: public,
        total_private_repos: private,
        followers: Some(42),
        public_members: Some(7),
    }
}

/// In-memory API serving a fixed sequence of repository pages
pub struct MockGitHubApi {
    organization: GitHubOrganization,
    pages: Vec<Vec<GitHubRepository>>,
    fail_organization: bool,
    fail_on_page: Option<u32>,
    page_calls: AtomicU32,
    organization_calls: AtomicU32,
}

impl MockGitHubApi {
    pub fn new(organization: GitHubOrganization) -> Self {
        Self {
            organization,
            pages: Vec::new(),
            fail_organization: false,
            fail_on_page: None,
            page_calls: AtomicU32::new(0),
            organization_calls: AtomicU32::new(0),
        }
    }

    pub fn with_pages(mut self, pages: Vec<Vec<GitHubRepository>>) -> Self {
        self.pages = pages;
        self
    }

    pub fn failing_organization(mut self) -> Self {
        self.fail_organization = true;
        self
    }

    pub fn failing_on_page(mut self, page: u32) -> Self {
        self.fail_on_page = Some(page);
        self
    }

    pub fn page_calls(&self) -> u32 {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub fn organization_calls(&self) -> u32 {
        self.organization_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GitHubApi for MockGitHubApi {
    async fn fetch_organization(&self, _org: &str) -> Result<GitHubOrganization> {
        self.organization_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_organization {
            return Err(GitHubMetricsError::ApiError(
                "API request failed with status 500 Internal Server Error: boom".to_string(),
            ));
        }
        Ok(self.organization.clone())
    }

    async fn fetch_repositories_page(
        &self,
        _org: &str,
        page: u32,
        _per_page: u32,
    ) -> Result<Vec<GitHubRepository>> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_page == Some(page) {
            return Err(GitHubMetricsError::NotFound(format!("page {}", page)));
        }
        Ok(self
            .pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_default())
    }
}

/// What the mock HTTP server saw for one request
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Option<String>,
    pub authorization: Vec<String>,
    pub accept: Option<String>,
}

impl RecordedRequest {
    pub fn query_param(&self, key: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}

#[derive(Clone)]
pub struct MockBehavior {
    pub organization: Value,
    pub organization_status: StatusCode,
    pub repo_pages: Vec<Value>,
    pub repo_status: StatusCode,
    pub rate_limited: bool,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            organization: json!({
                "login": TEST_ORG,
                "public_repos": 2,
                "total_private_repos": 1,
                "followers": 10,
                "public_members": 3
            }),
            organization_status: StatusCode::OK,
            repo_pages: vec![json!([
                {
                    "name": "alpha",
                    "html_url": "https://github.com/test-org/alpha",
                    "pushed_at": "2024-03-01T12:00:00Z",
                    "stargazers_count": 5,
                    "forks_count": 2
                },
                {
                    "name": "beta",
                    "html_url": "https://github.com/test-org/beta",
                    "pushed_at": null,
                    "stargazers_count": 1
                }
            ])],
            repo_status: StatusCode::OK,
            rate_limited: false,
        }
    }
}

#[derive(Clone)]
struct ServerState {
    behavior: MockBehavior,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct MockServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockServer {
    pub async fn start(behavior: MockBehavior) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = ServerState {
            behavior,
            requests: requests.clone(),
        };

        let app = Router::new().fallback(handle).with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("mock server address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server");
        });

        MockServer {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    pub fn config(&self, token: Option<&str>) -> Config {
        Config::new(TEST_ORG, token.map(str::to_string), &self.base_url).expect("valid config")
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn repo_requests(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.ends_with("/repos"))
            .collect()
    }
}

async fn handle(State(state): State<ServerState>, uri: Uri, headers: HeaderMap) -> Response {
    let recorded = RecordedRequest {
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get_all(header::AUTHORIZATION)
            .iter()
            .filter_map(|v| v.to_str().ok().map(str::to_string))
            .collect(),
        accept: headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };
    let page = recorded
        .query_param("page")
        .and_then(|p| p.parse::<usize>().ok())
        .unwrap_or(1);
    let is_repos = recorded.path.ends_with("/repos");
    state.requests.lock().expect("requests lock").push(recorded);

    let behavior = &state.behavior;
    if behavior.rate_limited {
        return (
            StatusCode::FORBIDDEN,
            [("x-ratelimit-remaining", "0"), ("x-ratelimit-reset", "1700000000")],
            Json(json!({ "message": "API rate limit exceeded" })),
        )
            .into_response();
    }

    if is_repos {
        let body = behavior
            .repo_pages
            .get(page.saturating_sub(1))
            .cloned()
            .unwrap_or_else(|| json!([]));
        (behavior.repo_status, Json(body)).into_response()
    } else {
        (behavior.organization_status, Json(behavior.organization.clone())).into_response()
    }
}
