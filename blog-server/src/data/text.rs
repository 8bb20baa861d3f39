//! Text matching used by the in-memory store.
//!
//! Mirrors what PostgreSQL does for the SQL backend: `similarity()` from
//! `pg_trgm`, and a weighted word match standing in for
//! `ts_rank(setweight(title, 'A') || setweight(body, 'B'), plainto_tsquery(..))`.

use std::collections::HashSet;

/// Weight of a title match (`A`) and a body match (`B`), as in `ts_rank`.
const TITLE_WEIGHT: f32 = 1.0;
const BODY_WEIGHT: f32 = 0.4;

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Distinct trigrams of every word, each padded with two leading blanks and
/// one trailing blank.
pub fn trigrams(text: &str) -> HashSet<String> {
    let mut set = HashSet::new();
    for word in words(text) {
        let padded: Vec<char> = format!("  {word} ").chars().collect();
        for window in padded.windows(3) {
            set.insert(window.iter().collect());
        }
    }
    set
}

/// Shared trigrams over the union of both trigram sets, in `0.0..=1.0`.
pub fn trigram_similarity(a: &str, b: &str) -> f32 {
    let left = trigrams(a);
    let right = trigrams(b);
    let common = left.intersection(&right).count();
    let total = left.len() + right.len() - common;
    if total == 0 {
        return 0.0;
    }
    common as f32 / total as f32
}

/// Rank of a document for a plain query where every query word must occur.
/// Returns `None` when the document does not match.
pub fn full_text_rank(title: &str, body: &str, query: &str) -> Option<f32> {
    let terms: Vec<String> = words(query).collect();
    if terms.is_empty() {
        return None;
    }

    let title_words: HashSet<String> = words(title).collect();
    let body_words: HashSet<String> = words(body).collect();

    let mut rank = 0.0;
    for term in &terms {
        if title_words.contains(term) {
            rank += TITLE_WEIGHT;
        } else if body_words.contains(term) {
            rank += BODY_WEIGHT;
        } else {
            return None;
        }
    }
    Some(rank / terms.len() as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigrams_pad_each_word() {
        let set = trigrams("cat");
        let expected: HashSet<String> = ["  c", " ca", "cat", "at "]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(set, expected);
    }

    #[test]
    fn trigrams_ignore_case_and_punctuation() {
        assert_eq!(trigrams("Hello, World!"), trigrams("hello world"));
    }

    #[test]
    fn identical_strings_are_fully_similar() {
        assert!((trigram_similarity("django", "Django") - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn known_pg_trgm_value() {
        // SELECT similarity('word', 'two words') = 0.36363637
        let score = trigram_similarity("word", "two words");
        assert!((score - 0.363_636_37).abs() < 1e-6, "got {score}");
    }

    #[test]
    fn unrelated_strings_score_zero() {
        assert_eq!(trigram_similarity("jazz", "quokka"), 0.0);
        assert_eq!(trigram_similarity("", ""), 0.0);
    }

    #[test]
    fn full_text_requires_every_term() {
        assert!(full_text_rank("Django tips", "about music", "django music").is_some());
        assert!(full_text_rank("Django tips", "about music", "django rust").is_none());
        assert!(full_text_rank("Django tips", "body", "   ").is_none());
    }

    #[test]
    fn title_matches_outrank_body_matches() {
        let title = full_text_rank("Rust tips", "nothing here", "rust").unwrap();
        let body = full_text_rank("Tips", "rust everywhere", "rust").unwrap();
        assert!(title > body);
    }
}
