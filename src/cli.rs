use clap::Parser;
use std::path::PathBuf;

/// Organization used when `GITHUB_ORG` is unset or blank
pub const DEFAULT_ORG: &str = "Abstract-Data";

pub const DEFAULT_API_URL: &str = "https://api.github.com";

pub const DEFAULT_OUTPUT: &str = "data/metrics.json";

#[derive(Parser, Debug)]
#[command(name = "org-profile-metrics")]
#[command(about = "Refreshes the metrics payload rendered on a GitHub organization profile")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// GitHub organization to summarize
    #[arg(long, env = "GITHUB_ORG", default_value = DEFAULT_ORG)]
    pub org: String,

    /// Bearer token sent with every API request, if present
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Where the metrics JSON is written, relative to the working directory
    #[arg(long, env = "METRICS_OUTPUT", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,
}
