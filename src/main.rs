//! crawl-audit main entry point
//!
//! This is the command-line interface for running one remote site audit.

use anyhow::Context;
use clap::Parser;
use crawl_audit::config::{load_config, validate_crawl_options, Config, CrawlOptions};
use crawl_audit::provider::HttpAuditProvider;
use crawl_audit::report::{print_report_summary, write_markdown_report};
use crawl_audit::storage::open_store;
use crawl_audit::{CrawlCoordinator, CrawlTask};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// crawl-audit: remote site-audit crawls
///
/// Submits a multi-page audit of a website to the configured provider, waits
/// for it to finish and prints a scored, categorized report.
#[derive(Parser, Debug)]
#[command(name = "crawl-audit")]
#[command(version)]
#[command(about = "Run a remote site-audit crawl", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Website to audit (e.g. example.com)
    #[arg(value_name = "TARGET")]
    target: String,

    /// Identifier to file the report under (defaults to the target's host)
    #[arg(long)]
    website_id: Option<String>,

    /// Maximum number of pages to crawl
    #[arg(long)]
    max_pages: Option<u32>,

    /// Minimum percentage of provider checks to run per page
    #[arg(long)]
    checks_threshold: Option<u8>,

    /// Disable JavaScript rendering
    #[arg(long)]
    no_javascript: bool,

    /// Resume polling an already submitted task instead of submitting a new one
    #[arg(long, value_name = "TASK_ID")]
    resume: Option<String>,

    /// Write a markdown report to this path
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    let options = crawl_options(&cli, &config);
    validate_crawl_options(&options).context("Invalid crawl options")?;

    let provider = HttpAuditProvider::new(&config.provider).context("Failed to build HTTP client")?;
    let store = open_store(Path::new(&config.output.database_path)).with_context(|| {
        format!("Failed to open database {}", config.output.database_path)
    })?;

    let coordinator = CrawlCoordinator::new(Arc::new(provider), Arc::new(store), config.polling);

    let mut task = match &cli.resume {
        Some(task_id) => {
            tracing::info!("Resuming task {}", task_id);
            coordinator.resume_crawl(task_id, &cli.target, cli.website_id.as_deref(), &options)?
        }
        None => coordinator
            .start_crawl_for(&cli.target, cli.website_id.as_deref(), &options)
            .await
            .context("Failed to submit crawl")?,
    };

    tracing::info!(
        "Task {} for {} in progress (polling every {:?}, at most {} checks)",
        task.task_id(),
        task.target_url,
        config.polling.interval,
        config.polling.max_attempts
    );

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let report = coordinator
        .poll_until_done(&mut task, &cancel)
        .await
        .with_context(|| format!("Crawl of {} did not complete", task.target_url))?;

    if !cli.quiet {
        print_report_summary(&report, &task.target_url);
    }

    if let Some(path) = report_path(&cli, &config, &task) {
        write_markdown_report(&report, &task.target_url, &path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        tracing::info!("Report written to {}", path.display());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crawl_audit=info,warn"),
            1 => EnvFilter::new("crawl_audit=debug,info"),
            2 => EnvFilter::new("crawl_audit=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line overrides on top of the configured job options
fn crawl_options(cli: &Cli, config: &Config) -> CrawlOptions {
    let mut options = config.crawl.clone();
    if let Some(max_pages) = cli.max_pages {
        options.max_pages = max_pages;
    }
    if let Some(threshold) = cli.checks_threshold {
        options.checks_threshold = threshold;
    }
    if cli.no_javascript {
        options.enable_javascript = false;
    }
    options
}

/// Cancels polling on Ctrl-C
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupt received, stopping after the current check");
                cancel.cancel();
            }
            Err(e) => tracing::error!("Could not listen for Ctrl-C: {}", e),
        }
    });
}

/// Where to write the markdown report, if anywhere
///
/// An explicit `--report` wins; otherwise the configured report directory is used.
fn report_path(cli: &Cli, config: &Config, task: &CrawlTask) -> Option<PathBuf> {
    if let Some(path) = &cli.report {
        return Some(path.clone());
    }

    config.output.report_dir.as_ref().map(|dir| {
        let name = format!("{}-{}.md", task.website_id.replace([':', '/'], "_"), task.task_id());
        Path::new(dir).join(name)
    })
}
