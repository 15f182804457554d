use crate::cli::{Cli, DEFAULT_API_URL, DEFAULT_ORG, DEFAULT_OUTPUT};
use crate::error::{GitHubMetricsError, Result};
use std::path::PathBuf;
use url::Url;

/// Settings resolved once at startup and handed to the client and aggregator.
#[derive(Debug, Clone)]
pub struct Config {
    pub organization: String,
    pub token: Option<String>,
    pub api_base_url: Url,
    pub output_path: PathBuf,
}

impl Config {
    pub fn new(organization: impl Into<String>, token: Option<String>, api_url: &str) -> Result<Self> {
        let organization = organization.into().trim().to_string();
        if organization.is_empty() {
            return Err(GitHubMetricsError::Config("organization must not be empty".to_string()));
        }

        Ok(Config {
            organization,
            token: normalize_token(token),
            api_base_url: parse_base_url(api_url)?,
            output_path: PathBuf::from(DEFAULT_OUTPUT),
        })
    }

    /// Blank values (an unset workflow variable exports `""`) fall back to the defaults.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let organization = or_default(&cli.org, DEFAULT_ORG);
        let api_url = or_default(&cli.api_url, DEFAULT_API_URL);
        let output = if cli.output.as_os_str().is_empty() {
            PathBuf::from(DEFAULT_OUTPUT)
        } else {
            cli.output.clone()
        };

        Ok(Config::new(organization, cli.token.clone(), api_url)?.with_output_path(output))
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Public web URL of the organization
    pub fn organization_url(&self) -> String {
        format!("https://github.com/{}", self.organization)
    }
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    match value.trim() {
        "" => default,
        trimmed => trimmed,
    }
}

// An empty GITHUB_TOKEN is what CI exports when the secret is unset.
fn normalize_token(token: Option<String>) -> Option<String> {
    token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())?;
    if url.cannot_be_a_base() {
        return Err(GitHubMetricsError::Config(format!("API URL cannot be used as a base: {}", raw)));
    }
    // Url::join drops the last path segment unless it ends with a slash.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
