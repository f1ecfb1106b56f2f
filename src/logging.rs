// src/logging.rs
// =============================================================================
// Sets up tracing output.
//
// Diagnostics (progress, skipped pages, ...) go to stderr, so stdout stays
// clean for tables and --json output.
//
// RUST_LOG controls the level, "info" when unset:
//   RUST_LOG=debug                        everything, including per-page details
//   RUST_LOG=ngram_crawler=debug,warn     our debug logs, only warnings from deps
// =============================================================================

use tracing_subscriber::EnvFilter;

pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // try_init: a second call (e.g. from tests) is ignored instead of panicking
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
