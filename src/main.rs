use anyhow::Context;
use clap::Parser;
use colored::*;
use org_profile_metrics::cli::Cli;
use org_profile_metrics::config::Config;
use org_profile_metrics::github::GitHubClient;
use org_profile_metrics::metrics::collect_metrics;
use org_profile_metrics::payload::{default_systems, write_payload, ProfilePayload};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load .env file if it exists
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!(error = %format!("{:#}", e), "Metrics refresh failed");
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_cli(&cli).context("Invalid configuration")?;

    println!("{}", "Organization Profile Metrics".bold().green());
    println!("{}\n", "=".repeat(50).dimmed());
    println!("Organization: {}", config.organization_url());

    let client = GitHubClient::new(&config).context("Failed to build GitHub client")?;
    if !client.has_token() {
        println!("{}", "No GITHUB_TOKEN set, using unauthenticated requests".yellow());
    }

    let snapshot = collect_metrics(&client, &config.organization).await;

    if let Some(reason) = snapshot.error() {
        println!("⚠️ {} {}", "Metrics degraded to zero:".yellow(), reason);
    } else {
        let metrics = snapshot.metrics();
        println!(
            "📊 {} repos, {} stars, {} forks",
            metrics.total_repos(),
            metrics.total_stars,
            metrics.total_forks
        );
    }

    let payload = ProfilePayload::build(&snapshot, default_systems());
    write_payload(&config.output_path, &payload).with_context(|| {
        format!("Failed to write metrics to {}", config.output_path.display())
    })?;

    println!("✅ Metrics written to {}", config.output_path.display());
    Ok(())
}
