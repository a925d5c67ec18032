//! kpop-crawler main entry point
//!
//! This is the command-line interface for the Mnet chart crawler.

use anyhow::Context;
use clap::Parser;
use kpop_crawler::chart::chart_requests;
use kpop_crawler::config::{load_config_with_hash, validate, Config};
use kpop_crawler::crawler::run_crawl;
use kpop_crawler::output::{print_statistics, JsonLinesSink, RecordSink};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use url::Url;

/// kpop-crawler: Mnet annual TOP100 chart scraper
///
/// Fetches both pages of each year's chart, follows every song link and
/// writes one JSON record per song with its rank, title, artist, duration
/// and contributor credits.
#[derive(Parser, Debug)]
#[command(name = "kpop-crawler")]
#[command(version)]
#[command(about = "Mnet annual TOP100 chart scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// First chart year, overriding the configuration
    #[arg(long)]
    start_year: Option<i32>,

    /// Last chart year, overriding the configuration
    #[arg(long)]
    end_year: Option<i32>,

    /// JSON Lines output file, overriding the configuration ("-" for stdout)
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show which chart pages would be fetched
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, hash) = match &cli.config {
        Some(path) => {
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };
    let config = apply_overrides(config, &cli)?;

    setup_logging(cli.verbose, cli.quiet, config.output.log_path.as_deref())?;

    match (&cli.config, hash) {
        (Some(path), Some(hash)) => tracing::info!(
            "Configuration loaded from {} (hash: {})",
            path.display(),
            hash
        ),
        _ => tracing::info!("Using default configuration"),
    }

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    handle_crawl(config).await
}

/// Applies command-line overrides and re-validates the result
fn apply_overrides(mut config: Config, cli: &Cli) -> anyhow::Result<Config> {
    if let Some(year) = cli.start_year {
        config.chart.start_year = year;
    }
    if let Some(year) = cli.end_year {
        config.chart.end_year = year;
    }
    if let Some(output) = &cli.output {
        config.output.items_path = (output != "-").then(|| output.clone());
    }
    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool, log_path: Option<&str>) -> anyhow::Result<()> {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("kpop_crawler=info,hyper=warn,reqwest=warn,warn"),
            1 => EnvFilter::new("kpop_crawler=debug,hyper=warn,reqwest=warn,info"),
            2 => EnvFilter::new("kpop_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    match log_path {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Cannot open log file {}", path))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== kpop-crawler Dry Run ===\n");

    println!("Chart:");
    println!(
        "  Years: {}-{}",
        config.chart.start_year, config.chart.end_year
    );
    println!("  Base URL: {}", config.chart.base_url);

    println!("\nCrawler:");
    println!(
        "  Max concurrent requests: {}",
        config.crawler.max_concurrent_requests
    );
    println!("  Retry times: {}", config.crawler.retry_times);
    println!("  Request timeout: {}s", config.crawler.request_timeout);
    println!("  User agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!(
        "  Items: {}",
        config.output.items_path.as_deref().unwrap_or("<stdout>")
    );
    println!(
        "  Log: {}",
        config.output.log_path.as_deref().unwrap_or("<stderr>")
    );

    let base_url = Url::parse(&config.chart.base_url)?;
    let requests = chart_requests(&base_url, config.chart.start_year, config.chart.end_year);

    println!("\nChart pages ({}):", requests.len());
    for request in &requests {
        println!("  - {} page {}: {}", request.year, request.page, request.url);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl up to {} songs",
        requests.len() as u32 * kpop_crawler::chart::RANKS_PER_PAGE
    );

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let items_path = config.output.items_path.clone();
    let sink: Box<dyn RecordSink> = match items_path.as_deref() {
        Some(path) => {
            tracing::info!("Writing songs to {}", path);
            Box::new(
                JsonLinesSink::create(Path::new(path))
                    .with_context(|| format!("Cannot create output file {}", path))?,
            )
        }
        None => Box::new(JsonLinesSink::stdout()),
    };

    match run_crawl(config, sink).await {
        Ok(stats) => {
            tracing::info!("Crawl completed successfully");
            // Songs stream to stdout when no file is set; keep it clean
            if items_path.is_some() {
                print_statistics(&stats);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
