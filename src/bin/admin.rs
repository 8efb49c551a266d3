//! CLI administration tool for users-cache.
//!
//! Operates on the same cache store and upstream as the server, using the same
//! environment configuration.
//!
//! # Usage
//!
//! ```bash
//! # Aggregate the dataset and store it, replacing any cached copy
//! cargo run --bin admin -- warm
//!
//! # Show what the cache currently holds
//! cargo run --bin admin -- show
//!
//! # Drop the cached dataset so the next request repopulates it
//! cargo run --bin admin -- clear --yes
//!
//! # Check cache connectivity
//! cargo run --bin admin -- check
//! ```

use users_cache::config::{self, Config};
use users_cache::infrastructure::cache::CacheService;
use users_cache::server::{build_service, connect_cache};
use users_cache::utils::record_codec;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::collections::BTreeMap;
use std::time::Instant;

/// CLI tool for managing the users-cache dataset.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Aggregate the dataset from the upstream and store it
    Warm,

    /// Show the cached dataset summary
    Show,

    /// Delete the cached dataset
    Clear {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Check cache connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;

    match cli.command {
        Commands::Warm => warm(&config).await?,
        Commands::Show => show(&config).await?,
        Commands::Clear { yes } => clear(&config, yes).await?,
        Commands::Check => check(&config).await?,
    }

    Ok(())
}

/// Runs a full population cycle and writes the result to the cache.
async fn warm(config: &Config) -> Result<()> {
    println!("{}", "🔄 Warming cache".bright_blue().bold());
    println!(
        "  {} records, {} per page, concurrency {}",
        config.total_records.to_string().cyan(),
        config.per_page.to_string().cyan(),
        config.fetch_concurrency.to_string().cyan()
    );

    let (service, _cache) = build_service(config).await?;

    let started = Instant::now();
    let payload = service
        .populate()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to populate cache: {}", e))?;

    let records = record_codec::decode(&payload.body)?;
    let expected = (config.total_records / config.per_page) * config.per_page;

    println!();
    println!(
        "{} {} records stored under {} in {:.1}s",
        "✅".green(),
        records.len().to_string().bright_white().bold(),
        service.settings().cache_key.cyan(),
        started.elapsed().as_secs_f64()
    );

    if records.len() < expected {
        println!(
            "{}",
            format!(
                "⚠️  {} of {} expected records are missing (upstream pages failed)",
                expected - records.len(),
                expected
            )
            .yellow()
        );
    }

    Ok(())
}

/// Prints the record count and a gender/country breakdown of the cached dataset.
async fn show(config: &Config) -> Result<()> {
    let cache = connect_cache(config).await?;

    let Some(payload) = cache.get(&config.cache_key).await? else {
        println!(
            "{} nothing cached under {}",
            "ℹ️ ".bright_blue(),
            config.cache_key.cyan()
        );
        return Ok(());
    };

    let records = record_codec::decode(&payload)?;

    let mut by_gender: BTreeMap<&str, usize> = BTreeMap::new();
    let mut by_country: BTreeMap<&str, usize> = BTreeMap::new();
    for record in &records {
        *by_gender.entry(record.gender.as_str()).or_default() += 1;
        *by_country.entry(record.country.as_str()).or_default() += 1;
    }

    println!("{}", "📦 Cached dataset".bright_blue().bold());
    println!("  Key:      {}", config.cache_key.cyan());
    println!("  Records:  {}", records.len().to_string().bright_white().bold());
    println!("  Size:     {} bytes", payload.len());
    println!();

    println!("{}", "By gender:".bright_white());
    for (gender, count) in &by_gender {
        println!("  {:<12} {}", gender, count);
    }

    println!();
    println!("{}", "Top countries:".bright_white());
    let mut countries: Vec<_> = by_country.into_iter().collect();
    countries.sort_by(|a, b| b.1.cmp(&a.1));
    for (country, count) in countries.into_iter().take(10) {
        println!("  {:<24} {}", country, count);
    }

    Ok(())
}

/// Deletes the cached dataset after confirmation.
async fn clear(config: &Config, skip_confirm: bool) -> Result<()> {
    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete cached dataset '{}'?", config.cache_key))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let cache = connect_cache(config).await?;

    if cache.delete(&config.cache_key).await? {
        println!("{} deleted {}", "✅".green(), config.cache_key.cyan());
    } else {
        println!(
            "{} nothing cached under {}",
            "ℹ️ ".bright_blue(),
            config.cache_key.cyan()
        );
    }

    Ok(())
}

/// Verifies the cache store answers PING.
async fn check(config: &Config) -> Result<()> {
    println!("{}", "🔍 Checking cache connection...".bright_blue());

    let cache = connect_cache(config).await?;

    if cache.health_check().await {
        println!("{}", "✅ Cache connection OK".green().bold());
        Ok(())
    } else {
        anyhow::bail!("Cache did not answer PING")
    }
}
