// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (stderr, filtered by RUST_LOG)
// 2. Parse command-line arguments using clap
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = success, 1 = some pages failed, 2 = error)
//
// Rust concepts used:
// - async/await: pages are fetched concurrently
// - Result<T, E>: fatal errors bubble up here through `?`
// - match: Pattern matching to handle different subcommands
// =============================================================================

mod cli;
mod crawl;
mod error;
mod extract;
mod links;
mod logging;
mod store;
mod tokenize;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, StatsTable};
use std::path::Path;
use store::{FrequencyStore, NGramKind, ValueCount};

#[tokio::main]
async fn main() {
    logging::init_logging();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = every page stored
//   Ok(1) = some pages were skipped because of errors
//   Err   = fatal error (exit code 2)
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl {
            sources,
            db,
            concurrency,
            timeout_secs,
            alphabet,
            no_compact,
            json,
        } => {
            let config =
                cli::crawl_config(sources, db, concurrency, timeout_secs, alphabet, no_compact);
            handle_crawl(config, json).await
        }
        Commands::Stats {
            db,
            table,
            limit,
            json,
        } => handle_stats(&db, table, limit, json),
        Commands::Compact { db } => {
            let store = open_store(&db)?;
            store.compact().context("compaction failed")?;
            println!("✅ Compacted {}", db.display());
            Ok(0)
        }
    }
}

async fn handle_crawl(config: crawl::CrawlConfig, json: bool) -> Result<i32> {
    let summary = match crawl::run_crawl(&config).await {
        Ok(summary) => summary,
        Err(e) if e.is_fatal() => return Err(e).context("crawl aborted"),
        // Per-page errors are absorbed by the crawl loop
        Err(e) => {
            eprintln!("❌ Crawl stopped early: {}", e);
            return Ok(1);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("📊 Summary:");
        println!("   📥 Seed links: {}", summary.seeds);
        println!("   🔁 Already processed: {}", summary.duplicates);
        println!("   ✅ Stored: {}", summary.stored);
        println!("   ❌ Failed: {}", summary.failed);
        println!("   🕳️  Missing pages: {}", summary.absent_pages);
        println!("   📝 Words counted: {}", summary.words);
        println!(
            "   ⏱️  Took {}",
            crawl::format_elapsed(std::time::Duration::from_secs(summary.elapsed_secs))
        );
    }

    Ok(if summary.failed > 0 { 1 } else { 0 })
}

fn open_store(db: &Path) -> Result<FrequencyStore> {
    FrequencyStore::open(db).with_context(|| format!("failed to open store {}", db.display()))
}

fn handle_stats(db: &Path, table: StatsTable, limit: usize, json: bool) -> Result<i32> {
    let store = open_store(db)?;

    // JSON keeps the view's own column names; the table printer only needs (label, count)
    let (json_rows, table_rows) = match table {
        StatsTable::Lengths => {
            let rows = store.word_lengths(limit)?;
            let labeled: Vec<(String, i64)> = rows
                .iter()
                .map(|row| (row.length.to_string(), row.count))
                .collect();
            (serde_json::to_value(&rows)?, labeled)
        }
        StatsTable::Words => values(store.top_words(limit)?)?,
        StatsTable::Letters => values(store.top_values(NGramKind::Letter, limit)?)?,
        StatsTable::Bigrams => values(store.top_values(NGramKind::Bigram, limit)?)?,
        StatsTable::Trigrams => values(store.top_values(NGramKind::Trigram, limit)?)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&json_rows)?);
    } else {
        print_table(&table_rows, store.total_words()?);
    }
    Ok(0)
}

fn values(rows: Vec<ValueCount>) -> Result<(serde_json::Value, Vec<(String, i64)>)> {
    let json = serde_json::to_value(&rows)?;
    let labeled = rows.into_iter().map(|row| (row.value, row.count)).collect();
    Ok((json, labeled))
}

fn print_table(rows: &[(String, i64)], total_words: i64) {
    println!("{:<30} {:>12}", "VALUE", "COUNT");
    println!("{}", "=".repeat(43));
    for (value, count) in rows {
        println!("{:<30} {:>12}", value, count);
    }
    println!();
    println!("📋 Total words stored: {}", total_words);
}
