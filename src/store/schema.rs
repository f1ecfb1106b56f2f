// src/store/schema.rs
// =============================================================================
// Table names and the schema of the frequency store.
//
// Tables:
// - links                 every link whose page was fully stored
// - words                 whole words, keyed by value
// - letters_by_position   \
// - bigrams_by_position    > keyed by (value, position)
// - trigrams_by_position  /
//
// Views (read side, summed and sorted by count):
// - words_view            total count per word length
// - <table>_view          total count per n-gram value, all positions merged
// =============================================================================

pub const LINKS_TABLE: &str = "links";
pub const WORDS_TABLE: &str = "words";
pub const WORDS_VIEW: &str = "words_view";

/// The three positional tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NGramKind {
    Letter,
    Bigram,
    Trigram,
}

impl NGramKind {
    pub fn table(self) -> &'static str {
        match self {
            NGramKind::Letter => "letters_by_position",
            NGramKind::Bigram => "bigrams_by_position",
            NGramKind::Trigram => "trigrams_by_position",
        }
    }

    pub fn view(self) -> &'static str {
        match self {
            NGramKind::Letter => "letters_by_position_view",
            NGramKind::Bigram => "bigrams_by_position_view",
            NGramKind::Trigram => "trigrams_by_position_view",
        }
    }
}

// Builds the full CREATE script, safe to run on every start
pub fn create_script() -> String {
    let mut script = format!(
        "BEGIN;

        CREATE TABLE IF NOT EXISTS {LINKS_TABLE} (
            link TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS {WORDS_TABLE} (
            value TEXT UNIQUE NOT NULL,
            count INTEGER NOT NULL DEFAULT 1
        );

        CREATE VIEW IF NOT EXISTS {WORDS_VIEW} (length, count) AS
        SELECT LENGTH(value) AS length, SUM(count) AS count
        FROM {WORDS_TABLE}
        GROUP BY LENGTH(value)
        ORDER BY SUM(count) DESC;
        "
    );

    for kind in [NGramKind::Letter, NGramKind::Bigram, NGramKind::Trigram] {
        let table = kind.table();
        let view = kind.view();
        script.push_str(&format!(
            "
            CREATE TABLE IF NOT EXISTS {table} (
                value    TEXT NOT NULL,
                position INTEGER NOT NULL,
                count    INTEGER NOT NULL DEFAULT 1
            );

            CREATE UNIQUE INDEX IF NOT EXISTS {table}_idx ON {table} (value, position);

            CREATE VIEW IF NOT EXISTS {view} (value, count) AS
            SELECT value, SUM(count) AS count
            FROM {table}
            GROUP BY value
            ORDER BY SUM(count) DESC;
            "
        ));
    }

    script.push_str("COMMIT;");
    script
}
