// src/store/sqlite.rs
// =============================================================================
// SQLite-backed frequency store.
//
// Every write is an "increment, or insert with count 1" upsert:
//
//   INSERT INTO words (value) VALUES (?),(?),(?)
//   ON CONFLICT(value) DO UPDATE SET count = count + 1;
//
// SQLite applies the rows of a multi-row VALUES one after another, so the
// same key appearing three times in one statement adds 3.
//
// Batches are split into chunks of INSERT_CHUNK_ROWS rows to stay under
// SQLite's bound-parameter limit. All chunks are applied.
//
// A page is written with commit_page(): words, letters, bigrams, trigrams
// and the processed-link mark share one transaction. If anything fails the
// transaction is dropped, which rolls it back.
//
// Rust concepts:
// - rusqlite::Transaction: rolls back on drop unless commit() was called
// - Deref: a Transaction can be used wherever a &Connection is expected
// - params_from_iter: binds a dynamic number of parameters
// =============================================================================

use super::schema::{create_script, NGramKind, LINKS_TABLE, WORDS_TABLE, WORDS_VIEW};
use crate::tokenize::{NGramBatch, PositionalNGram};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Transaction};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Maximum rows per INSERT statement
pub const INSERT_CHUNK_ROWS: usize = 2000;

/// One row of a `<table>_view`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: i64,
}

/// One row of `words_view`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LengthCount {
    pub length: i64,
    pub count: i64,
}

/// Owns the SQLite connection and all durable state
pub struct FrequencyStore {
    conn: Connection,
}

impl FrequencyStore {
    // Opens (creating if needed) the store file and prepares the schema
    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        conn.pragma_update(None, "wal_autocheckpoint", 50)?;
        debug!(path = %path.display(), journal_mode = %mode, "store opened");
        Self::with_schema(conn)
    }

    // Same schema, nothing on disk (tests and dry runs)
    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Self::with_schema(Connection::open_in_memory()?)
    }

    fn with_schema(conn: Connection) -> rusqlite::Result<Self> {
        conn.execute_batch(&create_script())?;
        Ok(FrequencyStore { conn })
    }

    /// Every link recorded as fully processed
    pub fn processed_links(&self) -> rusqlite::Result<HashSet<String>> {
        let mut stmt = self.conn.prepare(&format!("SELECT link FROM {LINKS_TABLE}"))?;
        let links = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<HashSet<String>>>()?;
        Ok(links)
    }

    /// Opens a transaction for one page
    pub fn begin(&mut self) -> rusqlite::Result<PageTransaction<'_>> {
        Ok(PageTransaction {
            tx: self.conn.transaction()?,
        })
    }

    // Writes a whole page atomically and marks its link as processed
    //
    // Either every count of the page lands together with the link, or
    // nothing does.
    pub fn commit_page(&mut self, link: &str, batch: &NGramBatch) -> rusqlite::Result<()> {
        let page = self.begin()?;
        page.upsert_words(&batch.words)?;
        page.upsert_positional(NGramKind::Letter, &batch.letters)?;
        page.upsert_positional(NGramKind::Bigram, &batch.bigrams)?;
        page.upsert_positional(NGramKind::Trigram, &batch.trigrams)?;
        page.mark_processed(link)?;
        page.commit()
    }

    /// Summed word counts grouped by word length, largest first
    pub fn word_lengths(&self, limit: usize) -> rusqlite::Result<Vec<LengthCount>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT length, count FROM {WORDS_VIEW} ORDER BY count DESC, length ASC LIMIT ?1"
        ))?;
        let rows = stmt
            .query_map([limit as i64], |row| {
                Ok(LengthCount {
                    length: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect();
        rows
    }

    /// Most frequent words
    pub fn top_words(&self, limit: usize) -> rusqlite::Result<Vec<ValueCount>> {
        self.top_from(WORDS_TABLE, limit)
    }

    /// Most frequent n-gram values, positions merged
    pub fn top_values(&self, kind: NGramKind, limit: usize) -> rusqlite::Result<Vec<ValueCount>> {
        self.top_from(kind.view(), limit)
    }

    fn top_from(&self, source: &str, limit: usize) -> rusqlite::Result<Vec<ValueCount>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT value, count FROM {source} ORDER BY count DESC, value ASC LIMIT ?1"
        ))?;
        let rows = stmt
            .query_map([limit as i64], |row| {
                Ok(ValueCount {
                    value: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect();
        rows
    }

    /// Sum of all word counts (every stored word occurrence)
    pub fn total_words(&self) -> rusqlite::Result<i64> {
        self.conn.query_row(
            &format!("SELECT COALESCE(SUM(count), 0) FROM {WORDS_TABLE}"),
            [],
            |row| row.get(0),
        )
    }

    // Maintenance pass: fold the WAL back into the main file and shrink it
    pub fn compact(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            "PRAGMA wal_checkpoint(TRUNCATE);
             PRAGMA shrink_memory;
             PRAGMA optimize;
             VACUUM;",
        )
    }

    #[cfg(test)]
    pub fn execute_script(&self, sql: &str) -> rusqlite::Result<()> {
        self.conn.execute_batch(sql)
    }

    #[cfg(test)]
    pub fn word_count(&self, value: &str) -> rusqlite::Result<Option<i64>> {
        use rusqlite::OptionalExtension;
        self.conn
            .query_row(
                &format!("SELECT count FROM {WORDS_TABLE} WHERE value = ?1"),
                [value],
                |row| row.get(0),
            )
            .optional()
    }

    #[cfg(test)]
    pub fn positional_count(
        &self,
        kind: NGramKind,
        value: &str,
        position: usize,
    ) -> rusqlite::Result<Option<i64>> {
        use rusqlite::OptionalExtension;
        self.conn
            .query_row(
                &format!(
                    "SELECT count FROM {} WHERE value = ?1 AND position = ?2",
                    kind.table()
                ),
                rusqlite::params![value, position as i64],
                |row| row.get(0),
            )
            .optional()
    }
}

/// Writes of one page; rolled back on drop unless committed
pub struct PageTransaction<'a> {
    tx: Transaction<'a>,
}

impl PageTransaction<'_> {
    /// Increments (or inserts) one count per word occurrence
    pub fn upsert_words(&self, words: &[String]) -> rusqlite::Result<()> {
        insert_words(&self.tx, words)
    }

    /// Increments (or inserts) one count per positional n-gram occurrence
    pub fn upsert_positional(
        &self,
        kind: NGramKind,
        entries: &[PositionalNGram],
    ) -> rusqlite::Result<()> {
        insert_positional(&self.tx, kind, entries)
    }

    /// Records a link as processed; recording it twice is an error
    pub fn mark_processed(&self, link: &str) -> rusqlite::Result<()> {
        insert_link(&self.tx, link)
    }

    pub fn commit(self) -> rusqlite::Result<()> {
        self.tx.commit()
    }
}

// "(?),(?),(?)" for n rows
fn placeholders(row: &str, n: usize) -> String {
    vec![row; n].join(",")
}

fn insert_words(conn: &Connection, words: &[String]) -> rusqlite::Result<()> {
    for chunk in words.chunks(INSERT_CHUNK_ROWS) {
        let sql = format!(
            "INSERT INTO {WORDS_TABLE} (value) VALUES {}
             ON CONFLICT(value) DO UPDATE SET count = count + 1;",
            placeholders("(?)", chunk.len())
        );
        conn.prepare_cached(&sql)?
            .execute(params_from_iter(chunk.iter()))?;
    }
    Ok(())
}

fn insert_positional(
    conn: &Connection,
    kind: NGramKind,
    entries: &[PositionalNGram],
) -> rusqlite::Result<()> {
    for chunk in entries.chunks(INSERT_CHUNK_ROWS) {
        let sql = format!(
            "INSERT INTO {} (value, position) VALUES {}
             ON CONFLICT(value, position) DO UPDATE SET count = count + 1;",
            kind.table(),
            placeholders("(?, ?)", chunk.len())
        );
        let values = chunk.iter().flat_map(|entry| {
            [
                Value::Text(entry.value.clone()),
                Value::Integer(entry.position as i64),
            ]
        });
        conn.prepare_cached(&sql)?.execute(params_from_iter(values))?;
    }
    Ok(())
}

fn insert_link(conn: &Connection, link: &str) -> rusqlite::Result<()> {
    conn.execute(&format!("INSERT INTO {LINKS_TABLE} (link) VALUES (?1)"), [link])?;
    Ok(())
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is an upsert?
//    - INSERT ... ON CONFLICT ... DO UPDATE
//    - Inserts the row, or updates the existing row with the same unique key
//    - Our update is count = count + 1, so every occurrence adds one
//
// 2. Why does begin() take &mut self?
//    - Connection::transaction() needs exclusive access to the connection
//    - PageTransaction<'_> keeps that borrow alive until commit or drop
//    - The borrow checker then guarantees nobody else writes mid-transaction
//
// 3. What happens if a `?` returns early inside commit_page?
//    - `page` goes out of scope
//    - Transaction's Drop impl rolls back everything done so far
//
// 4. Why prepare_cached?
//    - Full chunks always produce the same SQL text
//    - The connection keeps the compiled statement and reuses it
// -----------------------------------------------------------------------------
