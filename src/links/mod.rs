// src/links/mod.rs
// =============================================================================
// This module builds the crawl frontier.
//
// Submodules:
// - seeds: reads seed files (one link per line) from a directory
// - dedupe: drops links that were already processed in an earlier run
//
// Rust concepts:
// - Modules: Organize code into namespaces
// - pub use: Re-export items to simplify imports for users of this module
// =============================================================================

mod dedupe;
mod seeds;

pub use dedupe::{collapse_repeats, dedupe, Dedupe};
pub use seeds::read_seed_dir;
