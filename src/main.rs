mod config;
mod models;
mod scrapers;
mod server;
mod taxonomy;

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use models::SearchReport;
use scrapers::{filter, NicheFilter, PncpScraper, QueryOutcome};

#[derive(Parser)]
#[command(name = "bid-scout", version, about = "Search PNCP bidding announcements by niche and region")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "BID_SCOUT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API
    Serve,
    /// Run a single search and print the results
    Search {
        /// Niche id ("todos" for no keyword filter)
        #[arg(long, default_value = taxonomy::ALL_NICHES)]
        niche: String,
        /// Region code (UF)
        #[arg(long, default_value = "")]
        uf: String,
        /// Write the results as JSON to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List niches and region codes
    Niches,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve => {
            let scraper = PncpScraper::from_config(&config)?;
            server::serve(&config.server, Arc::new(scraper)).await
        }
        Command::Search { niche, uf, output } => search(&config, niche, uf, output).await,
        Command::Niches => {
            let catalog = taxonomy::catalog();
            for niche in &catalog.niches {
                println!("{:<18} {}", niche.id, niche.label);
            }
            println!();
            println!("UFs: {}", catalog.regions.join(", "));
            Ok(())
        }
    }
}

async fn search(
    config: &Config,
    niche: String,
    uf: String,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let scraper = PncpScraper::from_config(config)?;
    let filter = NicheFilter::new(niche, uf);
    let term = filter::compile(&filter).term_text;

    let query = filter.clone();
    let outcome = tokio::task::spawn_blocking(move || scraper.run(&query))
        .await
        .context("Search task panicked")?;

    let results = match outcome {
        QueryOutcome::Succeeded(results) => results,
        QueryOutcome::Failed(e) => bail!("Search failed: {}", e),
    };

    info!("Found {} bidding announcements", results.len());
    for (i, record) in results.iter().enumerate() {
        println!("{}. {}", i + 1, record.object_description);
        println!("   {} | {}", record.organ_entity, record.region_label);
        println!("   {} | {}", record.modality, record.opening_date_text);
        println!("   {} ({})", record.detail_url, record.source.label());
        println!();
    }

    if let Some(path) = output {
        let report = SearchReport {
            niche: filter.niche_id,
            region: Some(filter.region_code).filter(|r| !r.is_empty()),
            term,
            retrieved_at: Utc::now(),
            results,
        };
        let json = serde_json::to_string_pretty(&report)?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Saved results to {}", path.display());
    }

    Ok(())
}
