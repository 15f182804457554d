use crate::error::Result;
use crate::metrics::MetricsSnapshot;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Static entry in the `systems` list shown on the profile page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemDescriptor {
    pub name: String,
    pub description: String,
    pub status: String,
}

impl SystemDescriptor {
    fn new(name: &str, description: &str, status: &str) -> Self {
        SystemDescriptor {
            name: name.to_string(),
            description: description.to_string(),
            status: status.to_string(),
        }
    }
}

pub fn default_systems() -> Vec<SystemDescriptor> {
    vec![
        SystemDescriptor::new(
            "Profile Renderer",
            "Organization landing page built from the metrics payload",
            "active",
        ),
        SystemDescriptor::new(
            "Metrics Refresh",
            "Scheduled job that snapshots repository, star and fork counts",
            "active",
        ),
        SystemDescriptor::new(
            "Badge Assets",
            "Static badges embedded alongside the live metrics",
            "maintained",
        ),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSection {
    pub repos: u64,
    pub followers: u64,
    pub members: u64,
    pub total_stars: u64,
    pub total_forks: u64,
    pub latest_commit: Option<DateTime<Utc>>,
    pub latest_repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcesSection {
    pub github: String,
    pub latest_repository: Option<String>,
}

/// The document written to the metrics file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload {
    pub generated_at: String,
    pub systems: Vec<SystemDescriptor>,
    pub metrics: MetricsSection,
    pub sources: SourcesSection,
}

impl ProfilePayload {
    /// Payload stamped with the current time
    pub fn build(snapshot: &MetricsSnapshot, systems: Vec<SystemDescriptor>) -> Self {
        Self::at(snapshot, systems, Utc::now())
    }

    pub fn at(
        snapshot: &MetricsSnapshot,
        systems: Vec<SystemDescriptor>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let metrics = snapshot.metrics();
        let latest = metrics.latest_pushed_repository.as_ref();

        ProfilePayload {
            generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            systems,
            metrics: MetricsSection {
                repos: metrics.total_repos(),
                followers: metrics.followers,
                members: metrics.public_members,
                total_stars: metrics.total_stars,
                total_forks: metrics.total_forks,
                latest_commit: latest.map(|r| r.pushed_at),
                latest_repository: latest.map(|r| r.name.clone()),
                error: snapshot.error().map(str::to_string),
            },
            sources: SourcesSection {
                github: format!("https://github.com/{}", metrics.organization),
                latest_repository: latest.map(|r| r.html_url.clone()),
            },
        }
    }

    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

/// Write `payload` to `path`, creating parent directories and replacing any existing file.
pub fn write_payload(path: &Path, payload: &ProfilePayload) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, payload.to_json()?)?;
    info!(path = %path.display(), "Wrote metrics payload");
    Ok(())
}

pub fn read_payload(path: &Path) -> Result<ProfilePayload> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
