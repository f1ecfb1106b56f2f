// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Subcommands:
// - crawl:   read seed links, crawl what is new, update the statistics
// - stats:   print the most frequent words / letters / bigrams / trigrams
// - compact: checkpoint and vacuum the store file
//
// Rust concepts:
// - Structs and enums with derive macros (Parser, Subcommand, ValueEnum)
// - #[arg(default_value...)]: defaults live next to the flag they belong to
// =============================================================================

use crate::crawl::CrawlConfig;
use crate::tokenize::Alphabet;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "ngram-crawler",
    version = "0.1.0",
    about = "Crawls article pages and keeps word and positional letter n-gram frequencies",
    long_about = "ngram-crawler reads article links from seed files, fetches every article together \
                  with its comments page, and counts words, letters, bigrams and trigrams (by \
                  position inside the word) in a SQLite file. Links that were already processed \
                  are skipped, so the tool can be re-run as new seed links arrive."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl every seed link not processed yet
    ///
    /// Example: ngram-crawler crawl --sources ./sources/habr/ --db ./db.sqlite
    Crawl {
        /// Directory with seed files, one link per line
        #[arg(long, default_value = "./sources/habr/")]
        sources: PathBuf,

        /// SQLite file holding the statistics (created if missing)
        #[arg(long, default_value = "./db.sqlite")]
        db: PathBuf,

        /// How many links are fetched and parsed at the same time
        #[arg(long, default_value_t = 8)]
        concurrency: usize,

        /// Timeout for a single HTTP request, in seconds
        #[arg(long, default_value_t = 10)]
        timeout_secs: u64,

        /// Which letters count as word characters
        #[arg(long, value_enum, default_value_t = Alphabet::Cyrillic)]
        alphabet: Alphabet,

        /// Skip the checkpoint/VACUUM pass at the end of the run
        #[arg(long)]
        no_compact: bool,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the most frequent entries of a table
    ///
    /// Example: ngram-crawler stats --table bigrams --limit 30
    Stats {
        /// SQLite file holding the statistics
        #[arg(long, default_value = "./db.sqlite")]
        db: PathBuf,

        /// Which view to read
        #[arg(long, value_enum, default_value_t = StatsTable::Words)]
        table: StatsTable,

        /// How many rows to print
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Checkpoint the write-ahead log and VACUUM the store
    Compact {
        /// SQLite file holding the statistics
        #[arg(long, default_value = "./db.sqlite")]
        db: PathBuf,
    },
}

/// Views the stats command can print
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatsTable {
    /// Most frequent words
    Words,
    /// Word occurrences grouped by word length
    Lengths,
    Letters,
    Bigrams,
    Trigrams,
}

// Builds the crawl configuration from the `crawl` flags
pub fn crawl_config(
    sources: PathBuf,
    db: PathBuf,
    concurrency: usize,
    timeout_secs: u64,
    alphabet: Alphabet,
    no_compact: bool,
) -> CrawlConfig {
    CrawlConfig {
        sources,
        db,
        concurrency: concurrency.max(1),
        timeout: Duration::from_secs(timeout_secs),
        alphabet,
        compact: !no_compact,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawl_defaults() {
        let cli = Cli::parse_from(["ngram-crawler", "crawl"]);
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
                assert_eq!(sources, PathBuf::from("./sources/habr/"));
                assert_eq!(db, PathBuf::from("./db.sqlite"));
                assert_eq!(concurrency, 8);
                assert_eq!(timeout_secs, 10);
                assert_eq!(alphabet, Alphabet::Cyrillic);
                assert!(!no_compact);
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_stats_flags() {
        let cli = Cli::parse_from([
            "ngram-crawler", "stats", "--table", "bigrams", "--limit", "5", "--json",
        ]);
        match cli.command {
            Commands::Stats { table, limit, json, .. } => {
                assert_eq!(table, StatsTable::Bigrams);
                assert_eq!(limit, 5);
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_crawl_config_clamps_concurrency() {
        let config = crawl_config(
            PathBuf::from("s"),
            PathBuf::from("d"),
            0,
            3,
            Alphabet::Latin,
            true,
        );
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert!(!config.compact);
    }
}
