// src/store/mod.rs
// =============================================================================
// This module owns all durable state: the frequency tables and the log of
// processed links, both in one SQLite file.
//
// Submodules:
// - schema: table/view names and the CREATE script
// - sqlite: the FrequencyStore itself (upserts, page commits, views)
// =============================================================================

mod schema;
mod sqlite;

pub use schema::NGramKind;
pub use sqlite::{FrequencyStore, ValueCount};
