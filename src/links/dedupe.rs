// src/links/dedupe.rs
// =============================================================================
// Removes already-processed links from a candidate list.
//
// How it works:
// 1. The caller hands over the processed links as a HashSet (built once)
// 2. Each candidate is trimmed of trailing "\r"/"\n" and looked up in the set
// 3. Candidates not in the set survive, in input order, without their
//    line terminators (so the link that gets marked is the one looked up)
//
// Only line terminators are trimmed. "https://a " and "https://a" are two
// different links.
//
// Rust concepts:
// - HashSet: O(1) membership checks
// - Iterators: filter + collect in a single pass
// =============================================================================

use std::collections::HashSet;
use tracing::{debug, info};

// Result of a dedupe pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dedupe {
    /// Candidates not found in the processed set, trimmed, in input order
    pub fresh: Vec<String>,
    /// How many candidates were dropped
    pub duplicates: usize,
}

// Filters `candidates` against `processed`
//
// Parameters:
//   processed: links recorded as done by earlier runs
//   candidates: links read from the seed files
//
// Returns: the surviving candidates plus the duplicate count
//
// Repeated candidates are NOT collapsed here, see collapse_repeats().
pub fn dedupe(processed: &HashSet<String>, candidates: Vec<String>) -> Dedupe {
    let total = candidates.len();
    let fresh: Vec<String> = candidates
        .iter()
        .map(|link| trim_line_end(link))
        .filter(|link| {
            let seen = processed.contains(*link);
            if seen {
                debug!(link = *link, "already processed");
            }
            !seen
        })
        .map(str::to_string)
        .collect();
    let duplicates = total - fresh.len();

    info!(duplicates, total, "{}/{} duplicates", duplicates, total);

    Dedupe { fresh, duplicates }
}

// Keeps the first occurrence of every link, dropping later repeats
pub fn collapse_repeats(links: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    links
        .iter()
        .map(|link| trim_line_end(link).to_string())
        .filter(|link| seen.insert(link.clone()))
        .collect()
}

// Strips trailing carriage returns and newlines
pub fn trim_line_end(link: &str) -> &str {
    link.trim_end_matches(|c| c == '\r' || c == '\n')
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a HashSet instead of Vec::contains?
//    - Vec::contains walks the whole list: O(n) per lookup
//    - HashSet::contains hashes the key: O(1) per lookup
//    - Both lists grow with every run, so the difference adds up quickly
//
// 2. Why can we look up a &str in a HashSet<String>?
//    - String implements Borrow<str>
//    - HashSet::contains accepts any borrowed form of the key
//    - No temporary String is allocated for the lookup
//
// 3. What does trim_end_matches take?
//    - A "pattern": a char, a &str, or a closure |c| -> bool
//    - Here the closure matches both '\r' and '\n'
// -----------------------------------------------------------------------------
