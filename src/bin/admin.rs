//! CLI administration tool for snaplink.
//!
//! Inspects the mapping store snapshot without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # List every short link
//! cargo run --bin admin -- list
//!
//! # Show one link
//! cargo run --bin admin -- stats my-code
//!
//! # Verify the snapshot loads
//! cargo run --bin admin -- check
//!
//! # Decode a sequence code back to its record id
//! cargo run --bin admin -- decode 2n9c
//! ```
//!
//! # Environment Variables
//!
//! - `STORE_PATH`: snapshot file (default `data/urls.json`, overridden by `--store`)

use snaplink::domain::repositories::MappingStore;
use snaplink::infrastructure::persistence::FileMappingStore;
use snaplink::utils::base62;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};

/// CLI tool for inspecting a snaplink store.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path of the snapshot file
    #[arg(long, env = "STORE_PATH", default_value = "data/urls.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all short links
    List,

    /// Show target and clicks of a short code
    Stats {
        /// Short code to look up
        code: String,
    },

    /// Load the snapshot and report its health
    Check,

    /// Decode a base-62 sequence code into its numeric id
    Decode {
        /// Sequence code
        code: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::List => list_links(&open_store(&cli.store).await?).await,
        Commands::Stats { code } => show_stats(&open_store(&cli.store).await?, &code).await,
        Commands::Check => check_store(&open_store(&cli.store).await?).await,
        Commands::Decode { code } => decode_code(&code),
    }
}

async fn open_store(path: &Path) -> Result<FileMappingStore> {
    FileMappingStore::load_existing(path)
        .await
        .with_context(|| format!("Failed to load store at {}", path.display()))
}

/// Prints every finalized record ordered by id.
///
/// # Output Format
///
/// ```text
/// Short links
///
///   ID     Code                 Clicks   Target
///   ──────────────────────────────────────────────────────
///   1      apple-bravo          3        https://example.com
/// ```
async fn list_links(store: &FileMappingStore) -> Result<()> {
    println!("{}", "Short links".bright_blue().bold());
    println!();

    let records = store.list().await;

    if records.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    println!(
        "  {:<6} {:<20} {:<8} {}",
        "ID".bright_white().bold(),
        "Code".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Target".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for record in &records {
        println!(
            "  {:<6} {:<20} {:<8} {}",
            record.id.to_string().bright_black(),
            record.code.cyan(),
            record.clicks.to_string().green(),
            record.target
        );
    }

    let total_clicks: u64 = records.iter().map(|r| r.clicks).sum();

    println!();
    println!(
        "  Total: {} link(s), {} click(s)",
        records.len().to_string().bright_white().bold(),
        total_clicks.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

async fn show_stats(store: &FileMappingStore, code: &str) -> Result<()> {
    let stats = store
        .get_stats(code)
        .await
        .map_err(|e| anyhow::anyhow!("{}: {}", code, e))?;

    println!("{}", "Link statistics".bright_blue().bold());
    println!();
    println!("  Code:   {}", code.cyan());
    println!("  Target: {}", stats.target);
    println!("  Clicks: {}", stats.clicks.to_string().green().bold());
    println!();

    Ok(())
}

async fn check_store(store: &FileMappingStore) -> Result<()> {
    println!("{}", "Checking store...".bright_blue());

    let count = store.count().await;
    let next_id = store.next_id().await;

    println!("{}", "Store loaded successfully".green().bold());
    println!();
    println!("  Path:    {}", store.path().display().to_string().cyan());
    println!("  Links:   {}", count.to_string().bright_white().bold());
    println!("  Next ID: {}", next_id.to_string().bright_black());
    println!();

    Ok(())
}

fn decode_code(code: &str) -> Result<()> {
    let id = base62::decode(code).with_context(|| format!("'{}' is not a valid base-62 code", code))?;

    println!("  {} -> {}", code.cyan(), id.to_string().bright_white().bold());

    Ok(())
}
