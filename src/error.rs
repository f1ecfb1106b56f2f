// src/error.rs
// =============================================================================
// Error types for the crawl pipeline.
//
// Every failure is classified as either fatal (abort the whole run) or
// recoverable (skip the page, keep going). Only fatal errors stop a run;
// recoverable ones are logged and counted.
//
// Fatal:
// - Setup: the SQLite store could not be opened or its schema created
// - Seeds: the seed directory or one of its files could not be read
// - HttpClient: the HTTP client could not be built
//
// Recoverable (page-level):
// - InvalidLink: a seed line is not a URL we can derive a comments page from
// - Fetch: transport failure or timeout while fetching a page
// - Persist: the page transaction failed and was rolled back
//
// Rust concepts:
// - thiserror: derives std::error::Error and Display from attributes
// - #[source]: keeps the underlying error reachable for anyhow's chain output
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    /// The frequency store could not be opened or prepared
    #[error("failed to prepare store at {path}: {source}")]
    Setup {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// The seed directory (or a file in it) could not be read
    #[error("failed to read seed links from {path}: {source}")]
    Seeds {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client could not be built (TLS backend, bad settings)
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// A link could not be parsed as a URL
    #[error("invalid link '{link}': {source}")]
    InvalidLink {
        link: String,
        #[source]
        source: url::ParseError,
    },

    /// A network/transport failure (not a non-OK status, that one is just an empty page)
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The page transaction failed and was rolled back
    #[error("failed to persist page {link}: {source}")]
    Persist {
        link: String,
        #[source]
        source: rusqlite::Error,
    },
}

impl CrawlError {
    /// True when the run cannot continue after this error
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CrawlError::Setup { .. } | CrawlError::Seeds { .. } | CrawlError::HttpClient(_)
        )
    }
}
