use chrono::{DateTime, Utc};
use serde::Deserialize;

// GitHub API response structures.
// Counts are optional so an absent field stays distinguishable from an explicit zero.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubOrganization {
    pub public_repos: Option<u64>,
    pub total_private_repos: Option<u64>,
    pub followers: Option<u64>,
    pub public_members: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubRepository {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub html_url: String,
    pub pushed_at: Option<DateTime<Utc>>,
    pub stargazers_count: Option<u64>,
    pub forks_count: Option<u64>,
}
