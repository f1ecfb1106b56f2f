// src/tokenize/ngrams.rs
// =============================================================================
// Turns text fragments into words and positional letter n-grams.
//
// For every fragment:
// 1. Find word-like matches: an optional opening quote, letters, an optional
//    hyphenated tail and one trailing punctuation mark
//    ("«Привет»,"  -> "«Привет»"   "кто-нибудь" -> "кто-нибудь")
// 2. Lowercase and fold look-alike characters: « » -> "   – — -> -
// 3. Words are the pure letter runs inside each match
// 4. Letters, bigrams and trigrams come from the whole normalized match,
//    punctuation included, each tagged with the offset of its first character
//
// Example: "привет"
//   letters:  п@0 р@1 и@2 в@3 е@4 т@5
//   bigrams:  пр@0 ри@1 ив@2 ве@3 ет@4
//   trigrams: при@0 рив@1 иве@2 вет@3
//
// Rust concepts:
// - chars(): iterates Unicode scalar values, not bytes (Cyrillic is 2 bytes/char)
// - slice::windows(n): every overlapping run of n elements
// =============================================================================

use clap::ValueEnum;
use regex::Regex;

/// Letter classes the tokenizer can be built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Alphabet {
    /// Russian letters, including ё/Ё
    Cyrillic,
    /// Basic ASCII letters
    Latin,
}

impl Alphabet {
    // Body of a regex character class
    fn class(self) -> &'static str {
        match self {
            Alphabet::Cyrillic => "а-яА-ЯёЁ",
            Alphabet::Latin => "a-zA-Z",
        }
    }
}

/// An n-gram together with its offset inside the source word
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PositionalNGram {
    pub value: String,
    pub position: usize,
}

impl PositionalNGram {
    pub fn new(value: impl Into<String>, position: usize) -> Self {
        PositionalNGram {
            value: value.into(),
            position,
        }
    }
}

/// Everything one page (or fragment) contributes to the frequency tables
///
/// Repeated entries are intentional: every occurrence counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NGramBatch {
    pub words: Vec<String>,
    pub letters: Vec<PositionalNGram>,
    pub bigrams: Vec<PositionalNGram>,
    pub trigrams: Vec<PositionalNGram>,
}

impl NGramBatch {
    /// Appends another batch (used to fold fragments into one page batch)
    pub fn extend(&mut self, other: NGramBatch) {
        self.words.extend(other.words);
        self.letters.extend(other.letters);
        self.bigrams.extend(other.bigrams);
        self.trigrams.extend(other.trigrams);
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
            && self.letters.is_empty()
            && self.bigrams.is_empty()
            && self.trigrams.is_empty()
    }
}

/// Splits text into words and n-grams for one alphabet
#[derive(Debug, Clone)]
pub struct Tokenizer {
    segment: Regex,
    word: Regex,
}

impl Tokenizer {
    pub fn new(alphabet: Alphabet) -> Self {
        let class = alphabet.class();
        let segment = format!(r#"[«"]?[{class}]+(?:[-–—]?[{class}]*[»".,:;!?]?)?"#);
        let word = format!("[{class}]+");

        // Built from fixed character classes; only a bug in class() can break them
        Tokenizer {
            segment: Regex::new(&segment).expect("segment pattern is valid"),
            word: Regex::new(&word).expect("word pattern is valid"),
        }
    }

    // Aggregates a single fragment
    pub fn aggregate(&self, fragment: &str) -> NGramBatch {
        let mut batch = NGramBatch::default();

        for found in self.segment.find_iter(fragment) {
            let item = normalize(&found.as_str().to_lowercase());
            if item.is_empty() {
                continue;
            }

            batch
                .words
                .extend(self.word.find_iter(&item).map(|m| m.as_str().to_string()));

            let chars: Vec<char> = item.chars().collect();
            batch.letters.extend(positional(&chars, 1));
            batch.bigrams.extend(positional(&chars, 2));
            batch.trigrams.extend(positional(&chars, 3));
        }

        batch
    }

    // Aggregates every fragment of a page into one batch
    pub fn aggregate_all<'a, I>(&self, fragments: I) -> NGramBatch
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut batch = NGramBatch::default();
        for fragment in fragments {
            batch.extend(self.aggregate(fragment));
        }
        batch
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Tokenizer::new(Alphabet::Cyrillic)
    }
}

// Folds typographic quotes and dashes into their ASCII forms
fn normalize(item: &str) -> String {
    item.chars()
        .map(|c| match c {
            '«' | '»' => '"',
            '–' | '—' => '-',
            other => other,
        })
        .collect()
}

// Every n-character window with the offset of its first character
//
// Words shorter than n produce nothing (windows() yields no items).
fn positional(chars: &[char], n: usize) -> impl Iterator<Item = PositionalNGram> + '_ {
    chars
        .windows(n)
        .enumerate()
        .map(|(position, window)| PositionalNGram::new(window.iter().collect::<String>(), position))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(entries: &[PositionalNGram]) -> Vec<(&str, usize)> {
        entries.iter().map(|e| (e.value.as_str(), e.position)).collect()
    }

    #[test]
    fn test_single_word_ngrams() {
        let batch = Tokenizer::default().aggregate("Привет");
        assert_eq!(batch.words, vec!["привет"]);
        assert_eq!(
            values(&batch.letters),
            vec![("п", 0), ("р", 1), ("и", 2), ("в", 3), ("е", 4), ("т", 5)]
        );
        assert_eq!(
            values(&batch.bigrams),
            vec![("пр", 0), ("ри", 1), ("ив", 2), ("ве", 3), ("ет", 4)]
        );
        assert_eq!(
            values(&batch.trigrams),
            vec![("при", 0), ("рив", 1), ("иве", 2), ("вет", 3)]
        );
    }

    #[test]
    fn test_quotes_are_folded_and_kept_in_letters() {
        let batch = Tokenizer::default().aggregate("«Привет», — сказал он.");
        assert_eq!(batch.words, vec!["привет", "сказал", "он"]);
        // "\"привет\"" has 8 characters, "сказал" 6, "он." 3
        assert_eq!(batch.letters.len(), 8 + 6 + 3);
        assert_eq!(batch.letters[0], PositionalNGram::new("\"", 0));
        assert_eq!(batch.letters[7], PositionalNGram::new("\"", 7));
        assert_eq!(batch.trigrams.last(), Some(&PositionalNGram::new("он.", 0)));
    }

    #[test]
    fn test_hyphenated_word_is_one_match() {
        let batch = Tokenizer::default().aggregate("Кто—то пришёл");
        assert_eq!(batch.words, vec!["кто", "то", "пришёл"]);
        assert_eq!(batch.bigrams[2], PositionalNGram::new("о-", 2));
        assert_eq!(batch.letters.len(), 6 + 6);
    }

    #[test]
    fn test_short_words_have_no_long_grams() {
        let batch = Tokenizer::default().aggregate("я и мы");
        assert_eq!(batch.words, vec!["я", "и", "мы"]);
        assert_eq!(batch.letters.len(), 4);
        assert_eq!(values(&batch.bigrams), vec![("мы", 0)]);
        assert!(batch.trigrams.is_empty());
    }

    #[test]
    fn test_no_matches_yield_empty_batch() {
        assert!(Tokenizer::default().aggregate("123 -- !!! hello").is_empty());
    }

    #[test]
    fn test_latin_alphabet() {
        let batch = Tokenizer::new(Alphabet::Latin).aggregate("Hello, World!");
        assert_eq!(batch.words, vec!["hello", "world"]);
        assert_eq!(batch.letters.len(), 12);
    }

    #[test]
    fn test_aggregate_all_folds_fragments() {
        let tokenizer = Tokenizer::default();
        let batch = tokenizer.aggregate_all(["один", "два три"]);
        assert_eq!(batch.words, vec!["один", "два", "три"]);
        assert_eq!(batch.trigrams.len(), 2 + 1 + 1);
    }
}
