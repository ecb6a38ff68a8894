//! Run a single giveaway source on its own.
//!
//! Fetches the live source, prints every record it produced and writes the
//! source's standalone snapshot (e.g. `games.tg.json`) to the configured
//! snapshot directory. Useful for checking a parser without building the whole
//! catalog.
//!
//! Run with: cargo run --bin scrape-source -- <source>
//! Examples:
//!   cargo run --bin scrape-source -- telegram
//!   cargo run --bin scrape-source -- gamerpower-web
//!   cargo run --bin scrape-source -- gamerpower-api

use std::collections::HashMap;

use freegames_catalog::config::Config;
use freegames_catalog::global::Global;
use freegames_catalog::merge::normalize_name;
use freegames_catalog::sources;
use freegames_catalog::storage;
use freegames_catalog::types::GameRecord;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <source>", args[0]);
        print_known_sources();
        std::process::exit(1);
    }

    let Some(source) = sources::by_name(&args[1].to_lowercase()) else {
        eprintln!("Unknown source: {}", args[1]);
        print_known_sources();
        std::process::exit(1);
    };

    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .parse_lossy(&config.logging.level),
        )
        .init();

    let snapshot_dir = config.output.snapshot_dir.clone();
    let global = Global::init(config)?;

    println!("Fetching {}...\n", source.name());

    let records = source.fetch(&global).await?;
    print_results(&records);

    if records.is_empty() {
        println!("\nNo games found, snapshot not written.");
        return Ok(());
    }

    let document = storage::save_snapshot(&snapshot_dir, source.as_ref(), records).await?;
    println!(
        "\nSaved {} games to {}",
        document.total_games,
        snapshot_dir.join(source.snapshot_file()).display()
    );

    Ok(())
}

fn print_results(records: &[GameRecord]) {
    println!("Parsed {} games:\n", records.len());
    println!("{:<40} {:<18} {:<20} LINK", "NAME", "PLATFORM", "PRICE");
    println!("{}", "-".repeat(110));

    for record in records {
        println!(
            "{:<40} {:<18} {:<20} {}",
            record.name,
            record.platform.map_or("-", |p| p.slug()),
            record.price.as_deref().unwrap_or("-"),
            record.link.as_deref().unwrap_or("-"),
        );
    }

    let mut seen: HashMap<String, Vec<&str>> = HashMap::new();
    for record in records {
        seen.entry(normalize_name(&record.name))
            .or_default()
            .push(&record.name);
    }

    let duplicates: Vec<_> = seen.iter().filter(|(_, v)| v.len() > 1).collect();
    if duplicates.is_empty() {
        println!("\nNo duplicate names after normalization.");
    } else {
        println!("\nNames that will merge into one entry:");
        for (key, variants) in &duplicates {
            println!("  {:?} -> {:?}", key, variants);
        }
    }
}

fn print_known_sources() {
    eprintln!("Known sources:");
    eprintln!("  telegram");
    eprintln!("  gamerpower-web");
    eprintln!("  gamerpower-api");
}
