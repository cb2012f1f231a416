use channel_playlist::{Fetcher, PlaylistWriter};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::{fmt, prelude::*};

mod cli;
mod config;
mod error;
mod runner;

use cli::CliArgs;
use config::AppConfig;
use error::AppError;

fn main() {
    if let Err(e) = bootstrap() {
        eprintln!("Error: {e}");
        error!(error = ?e, "Application failed");
        std::process::exit(1);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn bootstrap() -> Result<(), AppError> {
    let args = CliArgs::parse();

    init_logging(args.verbose, args.quiet)?;

    let config = AppConfig::load(args.config.as_deref())?;
    let registry = config.registry()?;

    if args.list_sources {
        println!("Available sources:");
        for source in registry.iter() {
            println!("  - {} ({})", source.name, source.catalog_url);
        }
        return Ok(());
    }

    let sources = runner::select_sources(&registry, &args.sources)?;
    let sort = args.sort.unwrap_or(config.default_sort);
    let output_dir = args.output_dir.unwrap_or_else(|| config.output_dir.clone());

    let mut fetcher_config = config.fetcher_config();
    if let Some(timeout) = args.timeout {
        fetcher_config = fetcher_config.with_timeout(std::time::Duration::from_secs(timeout));
    }
    info!(
        "HTTP timeout configuration: overall={}s, connect={}s",
        fetcher_config.timeout.as_secs(),
        fetcher_config.connect_timeout.as_secs()
    );

    let fetcher = Fetcher::from_config(&fetcher_config)?;
    let writer = PlaylistWriter::new(output_dir);

    info!("Starting playlist generation process...");
    runner::run_sources(&sources, &fetcher, &writer, sort).await;
    info!("Playlist generation process finished.");

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) -> Result<(), AppError> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(verbose))
        .with(log_filter(verbose, quiet, rust_log.as_deref()))
        .try_init()
        .map_err(|e| AppError::Initialization(e.to_string()))
}

/// `--quiet` and `--verbose` win over `RUST_LOG`, which falls back to `info`.
fn log_filter(verbose: bool, quiet: bool, rust_log: Option<&str>) -> EnvFilter {
    if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        match rust_log.map(str::trim) {
            Some(directives) if !directives.is_empty() => EnvFilter::new(directives),
            _ => EnvFilter::new("info"),
        }
    }
}
