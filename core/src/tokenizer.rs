use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::BTreeSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref NON_LETTERS: Regex = Regex::new(r"[^\p{L}\s]+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Stems a line of text: NFKC normalization, lowercase, non-letter
/// characters stripped, whitespace-separated tokens run through the English
/// Snowball stemmer. Order and duplicates are preserved so callers can
/// assign sequential positions.
pub fn stems(line: &str) -> Vec<String> {
    let normalized = line.nfkc().collect::<String>().to_lowercase();
    let cleaned = NON_LETTERS.replace_all(&normalized, "");
    cleaned
        .split_whitespace()
        .map(|word| STEMMER.stem(word).to_string())
        .collect()
}

/// The sorted, deduplicated stems of a line, the canonical form of a query.
pub fn unique_stems(line: &str) -> BTreeSet<String> {
    stems(line).into_iter().collect()
}
