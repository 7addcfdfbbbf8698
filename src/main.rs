//! Lindex main entry point
//!
//! Loads the configuration, opens the store, and serves the HTTP API.
//! Crawling is driven through the API (`/api/startIndexing` and
//! friends), not from the command line.

use clap::Parser;
use lindex::analyzer::LemmaAnalyzer;
use lindex::api::{build_router, AppState};
use lindex::config::load_config;
use lindex::crawler::{IndexingCoordinator, PageFetcher};
use lindex::storage::Store;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Lindex: a site-scoped crawling search engine
///
/// Lindex crawls the configured sites, maintains a lemma-based inverted
/// index, and answers ranked queries over it through a small HTTP API.
#[derive(Parser, Debug)]
#[command(name = "lindex")]
#[command(version)]
#[command(about = "Site-scoped crawling search engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the configured listen address
    #[arg(long)]
    address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    tracing::info!("Configured sites: {}", config.sites.len());

    let store = Arc::new(Store::open(Path::new(&config.indexing.database_path))?);
    let analyzer = Arc::new(LemmaAnalyzer::with_default_backends());
    let fetcher = Arc::new(PageFetcher::new(&config.fetch)?);
    let coordinator = Arc::new(IndexingCoordinator::new(
        Arc::clone(&store),
        analyzer,
        fetcher,
        &config,
    ));

    let state = AppState::new(store, coordinator);
    let app = build_router(state);

    let address = cli.address.unwrap_or_else(|| config.server.address.clone());
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("API listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("lindex=info,warn"),
            1 => EnvFilter::new("lindex=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
