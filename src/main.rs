//! pokefetch - Fetch Pokémon data from PokeAPI into a CSV report
//!
//! Reads the Pokémon list and per-Pokémon details from PokeAPI (or the local
//! cache), optionally downloads sprite images, and writes the selected fields
//! to a CSV file.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use pokefetch::cache::CacheManager;
use pokefetch::cli::{Cli, RunConfig};
use pokefetch::data::PokeApiClient;
use pokefetch::fetch::{FetchError, Fetcher, RunSummary};
use pokefetch::logging::init_logging;
use pokefetch::report::{preview, ReportWriter};

/// Number of CSV lines shown after a run, header included
const SAMPLE_LINES: usize = 6;

/// Runs a fetch with the given configuration
async fn run(config: &RunConfig) -> Result<RunSummary, FetchError> {
    let fields: Vec<&str> = config.fields.iter().map(|f| f.as_str()).collect();
    info!("Starting Pokémon data fetcher");
    info!("Force refresh: {}", config.force_refresh);
    info!("Fields to fetch: {}", fields.join(", "));
    info!("Download images: {}", config.download_images);
    if let Some(limit) = config.limit {
        info!("Processing limit: {} Pokémon", limit);
    }

    let mut report = ReportWriter::create(&config.output, &config.fields)?;
    let cache = CacheManager::new(&config.cache_dir, &config.sprites_dir);
    let api = PokeApiClient::with_base_url(&config.base_url);
    let fetcher = Fetcher::new(api, cache, config.fetch_options());

    let summary = fetcher.run(&mut report).await?;
    report.finish()?;
    Ok(summary)
}

/// Prints the run summary and the first lines of the report
fn print_summary(config: &RunConfig, summary: &RunSummary) {
    println!(
        "Done! Wrote {} of {} Pokémon ({} network requests, {} cache hits).",
        summary.rows, summary.total, summary.network_requests, summary.cache_hits
    );
    println!("Total time: {:.1} seconds", summary.elapsed.as_secs_f64());
    println!("Data saved to {}", config.output.display());
    if config.saves_sprites() {
        println!("Sprite images saved to {}/", config.sprites_dir.display());
    }

    match preview(&config.output, SAMPLE_LINES.min(summary.rows + 1)) {
        Ok(lines) => {
            println!("\nSample of the CSV data:");
            for line in lines {
                println!("{}", line);
            }
        }
        Err(e) => error!("Could not read sample data: {}", e),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("Failed to initialise logging: {}", e);
    }

    let config = match RunConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&config).await {
        Ok(summary) => {
            print_summary(&config, &summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
