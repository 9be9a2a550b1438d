//! Tokenization: case-fold, stem, stop-word filter, zone-tag.
//!
//! Word splitting and Porter stemming are treated as a pure external
//! collaborator (`stem: &str -> String`), backed here by `rust-stemmers`
//! (the same Snowball/Porter crate used by the `PSeitz-tantivy` fork in the
//! reference corpus).

use std::collections::HashSet;

use rust_stemmers::{Algorithm, Stemmer};

use crate::types::{Term, Zone};

/// Splits `text` into lowercase word tokens on whitespace/punctuation
/// boundaries, dropping tokens that are pure punctuation once split.
fn word_tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn is_punctuation_only(token: &str) -> bool {
    !token.chars().any(|c| c.is_alphanumeric())
}

/// Tokenize `text` from zone `zone` into zone-qualified terms, preserving
/// surface order. `stopwords` are matched after stemming and lowercasing.
pub fn tokenize(text: &str, zone: Zone, stopwords: &HashSet<String>) -> Vec<Term> {
    let stemmer = Stemmer::create(Algorithm::English);
    word_tokenize(text)
        .into_iter()
        .filter(|w| !is_punctuation_only(w))
        .map(|w| stemmer.stem(&w).to_string())
        .filter(|stem| !stopwords.contains(stem))
        .map(|stem| Term::new(zone, &stem))
        .collect()
}

/// Stem a single already-split word (lowercase, Porter-stem). Used by the
/// query engine for phrase and boolean query terms, which are zone-tagged
/// explicitly rather than through the full [`tokenize`] pipeline.
pub fn stem_word(word: &str) -> String {
    let stemmer = Stemmer::create(Algorithm::English);
    stemmer.stem(&word.to_lowercase()).to_string()
}

/// Load a whitespace-separated stop-word list (already lowercase).
pub fn load_stopwords(text: &str) -> HashSet<String> {
    text.split_whitespace().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_applies_stopwords_after_stemming() {
        let stopwords = load_stopwords("the");
        let terms = tokenize("The cat sat", Zone::Content, &stopwords);
        let rendered: Vec<String> = terms.iter().map(|t| t.as_str().to_string()).collect();
        assert_eq!(rendered, vec!["content@cat", "content@sat"]);
    }

    #[test]
    fn tokenize_drops_pure_punctuation() {
        let stopwords = HashSet::new();
        let terms = tokenize("hello -- world", Zone::Title, &stopwords);
        assert_eq!(terms.len(), 2);
    }

    #[test]
    fn stem_word_matches_tokenize_stem() {
        let stopwords = HashSet::new();
        let terms = tokenize("running", Zone::Content, &stopwords);
        assert_eq!(terms[0].stem(), stem_word("running"));
    }

    #[test]
    fn tokenize_zone_tags_every_term() {
        let stopwords = HashSet::new();
        let terms = tokenize("plaintiff defendant", Zone::Parties, &stopwords);
        assert!(terms.iter().all(|t| t.zone() == Some(Zone::Parties)));
    }
}
