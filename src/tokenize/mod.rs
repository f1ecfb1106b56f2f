// src/tokenize/mod.rs
// =============================================================================
// Word and positional n-gram extraction.
//
// A page's fragments all fold into a single NGramBatch, which the store
// writes in one transaction.
// =============================================================================

mod ngrams;

pub use ngrams::{Alphabet, NGramBatch, PositionalNGram, Tokenizer};
