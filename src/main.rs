mod config;
mod enrich;
mod extract;
mod pipeline;
mod report;
mod snapshot;
mod storage;

use anyhow::{Context, Result};
use config::PipelineConfig;
use dotenv::dotenv;
use enrich::{EnrichmentResolver, YahooNewsFeed, YahooProfileLookup};
use pipeline::{HttpPageFetcher, Orchestrator};
use std::sync::Arc;
use storage::SqliteSink;

/// Entry point for one capture run.
///
/// # Workflow Steps
/// - Initialize logging and load `.env`
/// - Build the configuration and the HTTP collaborators
/// - Run the pipeline: fetch → extract → enrich → assemble → persist
/// - Print the rendered snapshot and any warnings the run accumulated
///
/// # Returns
/// `Ok(())` when a snapshot was captured and persisted; an error when the
/// source page was unreachable or contained no recognizable table.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file
    dotenv().ok();

    let config = PipelineConfig::from_env();

    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .build()
        .context("failed to build HTTP client")?;

    let resolver = EnrichmentResolver::new(
        Arc::new(YahooProfileLookup::new(client.clone())),
        Arc::new(YahooNewsFeed::new(client.clone())),
        config.lookup_timeout,
        config.max_concurrent_lookups,
    );
    let sink = SqliteSink::open(&config.db_path)?;

    let mut orchestrator = Orchestrator::new(
        config,
        Arc::new(HttpPageFetcher::new(client)),
        resolver,
        Box::new(sink),
    );

    let outcome = orchestrator.run().await?;

    println!("{}", report::render_text(&outcome.snapshot));

    if !outcome.warnings.is_empty() {
        println!("{} warning(s):", outcome.warnings.len());
        for warning in &outcome.warnings {
            println!("  - {}", warning);
        }
    }

    Ok(())
}
