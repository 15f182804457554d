//! Organization metrics aggregation.
//!
//! [`collect_metrics`] reads the organization record and every repository
//! page, then folds them into an [`OrganizationMetrics`] snapshot. Failures
//! never reach the caller: they come back as [`MetricsSnapshot::Degraded`]
//! carrying zeroed metrics and the error text.

use crate::error::Result;
use crate::github::GitHubApi;
use crate::types::{GitHubOrganization, GitHubRepository};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Repositories requested per page; a shorter page ends pagination.
pub const PER_PAGE: u32 = 100;

/// The most recently pushed repository of an organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestRepository {
    pub name: String,
    pub pushed_at: DateTime<Utc>,
    pub html_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationMetrics {
    pub organization: String,
    pub public_repos: u64,
    pub private_repos: u64,
    pub followers: u64,
    pub public_members: u64,
    pub total_stars: u64,
    pub total_forks: u64,
    pub latest_pushed_repository: Option<LatestRepository>,
}

impl OrganizationMetrics {
    /// All-zero metrics for an organization
    pub fn zeroed(organization: impl Into<String>) -> Self {
        OrganizationMetrics {
            organization: organization.into(),
            ..Default::default()
        }
    }

    /// Public plus private repositories, saturating at `u64::MAX`
    pub fn total_repos(&self) -> u64 {
        self.public_repos.saturating_add(self.private_repos)
    }
}

/// Outcome of one aggregation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricsSnapshot {
    Live(OrganizationMetrics),
    Degraded {
        metrics: OrganizationMetrics,
        error: String,
    },
}

impl MetricsSnapshot {
    pub fn degraded(organization: impl Into<String>, error: impl Into<String>) -> Self {
        MetricsSnapshot::Degraded {
            metrics: OrganizationMetrics::zeroed(organization),
            error: error.into(),
        }
    }

    pub fn metrics(&self) -> &OrganizationMetrics {
        match self {
            MetricsSnapshot::Live(metrics) => metrics,
            MetricsSnapshot::Degraded { metrics, .. } => metrics,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            MetricsSnapshot::Live(_) => None,
            MetricsSnapshot::Degraded { error, .. } => Some(error),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, MetricsSnapshot::Degraded { .. })
    }
}

/// Walk `/orgs/{org}/repos` page by page until a page comes back short or empty.
pub async fn fetch_all_repositories<A>(api: &A, org: &str) -> Result<Vec<GitHubRepository>>
where
    A: GitHubApi + ?Sized,
{
    let mut repos = Vec::new();
    let mut page = 1;

    loop {
        let batch = api.fetch_repositories_page(org, page, PER_PAGE).await?;
        let has_more = batch.len() == PER_PAGE as usize;
        repos.extend(batch);

        if !has_more {
            break;
        }
        page += 1;
    }

    debug!(org, pages = page, repos = repos.len(), "Repository listing complete");
    Ok(repos)
}

/// Fetch and aggregate metrics for `org`. Never fails; see [`MetricsSnapshot`].
pub async fn collect_metrics<A>(api: &A, org: &str) -> MetricsSnapshot
where
    A: GitHubApi + ?Sized,
{
    let fetched = futures::future::try_join(
        api.fetch_organization(org),
        fetch_all_repositories(api, org),
    )
    .await;

    match fetched {
        Ok((organization, repos)) => {
            let metrics = aggregate(org, &organization, &repos);
            info!(
                org,
                repos = metrics.total_repos(),
                stars = metrics.total_stars,
                forks = metrics.total_forks,
                "Collected organization metrics"
            );
            MetricsSnapshot::Live(metrics)
        }
        Err(e) => {
            warn!(org, error = %e, "Failed to collect organization metrics, using zeroed values");
            MetricsSnapshot::degraded(org, e.to_string())
        }
    }
}

/// Fold the organization record and its repositories into a metrics snapshot.
///
/// `public_repos` falls back to the number of listed repositories only when
/// the field is absent; an explicit zero is kept.
pub fn aggregate(
    org: &str,
    organization: &GitHubOrganization,
    repos: &[GitHubRepository],
) -> OrganizationMetrics {
    let total_stars = saturating_sum(repos.iter().map(|r| r.stargazers_count));
    let total_forks = saturating_sum(repos.iter().map(|r| r.forks_count));

    OrganizationMetrics {
        organization: org.to_string(),
        public_repos: organization.public_repos.unwrap_or(repos.len() as u64),
        private_repos: organization.total_private_repos.unwrap_or(0),
        followers: organization.followers.unwrap_or(0),
        public_members: organization.public_members.unwrap_or(0),
        total_stars,
        total_forks,
        latest_pushed_repository: latest_pushed(repos),
    }
}

// Counts come straight from the API; absurd values must not panic the run.
fn saturating_sum(counts: impl Iterator<Item = Option<u64>>) -> u64 {
    counts.fold(0u64, |acc, n| acc.saturating_add(n.unwrap_or(0)))
}

/// Most recently pushed repository; on equal timestamps the earliest in list order wins.
pub fn latest_pushed(repos: &[GitHubRepository]) -> Option<LatestRepository> {
    let mut latest: Option<(&GitHubRepository, DateTime<Utc>)> = None;

    for repo in repos {
        let Some(pushed_at) = repo.pushed_at else {
            continue;
        };
        match latest {
            Some((_, current)) if pushed_at <= current => {}
            _ => latest = Some((repo, pushed_at)),
        }
    }

    latest.map(|(repo, pushed_at)| LatestRepository {
        name: repo.name.clone(),
        pushed_at,
        html_url: repo.html_url.clone(),
    })
}
