//! CLI for the showcase portfolio site generator.
//!
//! Three subcommands cover the pipeline: `update-cache` refreshes the
//! repos.json snapshot, `capture-shots` fills in missing screenshots, and
//! `render` writes the static page.

use clap::{Parser, Subcommand};
use showcase::{
    build_client, capture_shots, render_site, update_cache, CaptureSummary, FilterCategory,
    RenderReport, SiteConfig, UpdateReport,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Showcase - render a portfolio page for a GitHub user's public repos.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the site configuration file.
    #[arg(long, default_value = "site.toml")]
    config: PathBuf,

    /// GitHub token; unauthenticated access works but is rate limited.
    #[arg(long, env = "GITHUB_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Refresh repos.json and bump the entry point's asset versions.
    UpdateCache,

    /// Capture missing screenshots for repos with a site URL.
    CaptureShots,

    /// Render index.html and its static assets.
    Render {
        /// Bake a search query into the rendered grid.
        #[arg(long, default_value = "")]
        query: String,

        /// Bake a category filter into the rendered grid.
        #[arg(long, default_value = "all")]
        filter: FilterCategory,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args = Args::parse();

    let config = match SiteConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return ExitCode::from(2);
        }
    };

    // GH_TOKEN is accepted as a fallback for CI environments that set it.
    let token = args.token.or_else(|| std::env::var("GH_TOKEN").ok());

    match args.command {
        Command::UpdateCache => run_update(&config, token).await,
        Command::CaptureShots => run_capture(&config).await,
        Command::Render { query, filter } => run_render(&config, token, &query, filter).await,
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

async fn run_update(config: &SiteConfig, token: Option<String>) -> ExitCode {
    let octocrab = match build_client(token) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to build GitHub client");
            return ExitCode::from(2);
        }
    };

    match update_cache(&octocrab, config).await {
        Ok(report) => {
            print_update_report(&report);
            ExitCode::from(0)
        }
        Err(e) => {
            error!(error = %e, "Cache update failed");
            ExitCode::from(2)
        }
    }
}

async fn run_capture(config: &SiteConfig) -> ExitCode {
    match capture_shots(config).await {
        Ok(summary) => {
            print_capture_summary(&summary);
            if summary.has_failures() {
                ExitCode::from(1)
            } else {
                ExitCode::from(0)
            }
        }
        Err(e) => {
            error!(error = %e, "Capture batch failed");
            ExitCode::from(2)
        }
    }
}

async fn run_render(
    config: &SiteConfig,
    token: Option<String>,
    query: &str,
    filter: FilterCategory,
) -> ExitCode {
    let octocrab = match build_client(token) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to build GitHub client");
            return ExitCode::from(2);
        }
    };

    match render_site(&octocrab, config, query, filter).await {
        Ok(report) => {
            print_render_report(&report);
            ExitCode::from(0)
        }
        Err(e) => {
            error!(error = %e, "Render failed");
            ExitCode::from(2)
        }
    }
}

/// Prints the cache update summary.
fn print_update_report(report: &UpdateReport) {
    println!("\nSummary:");
    println!("  Repos written: {}", report.repo_count);
    println!("  Asset version: {}", report.asset_version);

    if !report.missing_descriptions.is_empty() {
        println!(
            "  Missing descriptions ({}): {}",
            report.missing_descriptions.len(),
            report.missing_descriptions.join(", ")
        );
    }
}

/// Prints the capture batch summary.
fn print_capture_summary(summary: &CaptureSummary) {
    println!("\nSummary:");
    println!("  Captured: {}", summary.captured);
    println!("  Skipped (existing): {}", summary.skipped_existing);
    println!("  No site URL: {}", summary.no_site_url);
    println!("  Failed: {}", summary.failed);
}

/// Prints the render summary.
fn print_render_report(report: &RenderReport) {
    println!("\nSummary:");
    println!(
        "  Source: {}",
        if report.degraded.is_some() {
            "unavailable (error panel rendered)"
        } else if report.from_cache {
            "snapshot"
        } else {
            "live API"
        }
    );
    println!("  Repos: {}", report.repo_count);
    println!("  Visible cards: {}", report.visible_count);
    println!("  Wrote: {}", report.output.display());
}
