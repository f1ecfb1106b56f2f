// src/crawl/mod.rs
// =============================================================================
// This module drives a crawl run.
//
// Features:
// - Fetches each article together with its comments page
// - Bounded number of links in flight at once
// - Per-request timeout
// - One store transaction per link, written in frontier order
//
// Submodules:
// - fetch: the HTTP boundary (and the Fetch trait for tests)
// - pipeline: dedupe, fetch, extract, aggregate, persist
// - progress: percent/elapsed reporting
// =============================================================================

mod fetch;
mod pipeline;
mod progress;

pub use pipeline::{run_crawl, CrawlConfig};
pub use progress::format_elapsed;
