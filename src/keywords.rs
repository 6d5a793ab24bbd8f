//! Frequency-ranked keyword extraction.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::sanitize::sanitize;

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\p{Alphabetic}{3,}\b").unwrap());

/// Common English function words never reported as keywords.
pub const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "was", "are", "were", "been", "be", "have", "has", "had", "do", "does",
    "did", "will", "would", "should", "could", "may", "might", "must", "can", "this", "that",
    "these", "those", "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us",
    "them", "my", "your", "his", "its", "our", "their", "what", "which", "who", "whom", "whose",
    "where", "when", "why", "how", "all", "each", "every", "both", "few", "more", "most",
    "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than", "too",
    "very", "just", "now",
];

static STOPWORD_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOPWORDS.iter().copied().collect());

pub fn is_stopword(word: &str) -> bool {
    STOPWORD_SET.contains(word)
}

/// Token counts in first-seen order.
fn count_tokens(lowered: &str) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for token in TOKEN.find_iter(lowered).map(|m| m.as_str()) {
        if is_stopword(token) {
            continue;
        }
        match index.get(token) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                index.insert(token, counts.len());
                counts.push((token.to_string(), 1));
            }
        }
    }

    counts
}

/// Rank the keywords of `text` by frequency, returning at most `max`.
///
/// The text is sanitized and lowercased; tokens are runs of three or more
/// letters with stopwords removed. Equal counts keep first-seen order.
pub fn extract_keywords(text: &str, max: usize) -> Vec<String> {
    if max == 0 {
        return Vec::new();
    }

    let lowered = sanitize(text).to_lowercase();
    let mut counts = count_tokens(&lowered);
    // Stable sort keeps first-seen order among ties.
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    counts.into_iter().take(max).map(|(word, _)| word).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ranks_by_frequency() {
        let text = "Pizza was cold. The pizza crust was soggy, the pizza sauce bland. Sauce again!";
        let keywords = extract_keywords(text, 3);
        assert_eq!(keywords, vec!["pizza", "sauce", "cold"]);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let keywords = extract_keywords("zesty apple mango zesty apple mango", 10);
        assert_eq!(keywords, vec!["zesty", "apple", "mango"]);
    }

    #[test]
    fn test_removes_stopwords_and_short_tokens() {
        let keywords = extract_keywords("It is the BEST of all, and we ate it up", 10);
        assert_eq!(keywords, vec!["best", "ate"]);
    }

    #[test]
    fn test_stopwords_next_to_punctuation_are_removed() {
        let keywords = extract_keywords("the, THE; the... noodles", 10);
        assert_eq!(keywords, vec!["noodles"]);
    }

    #[test]
    fn test_sanitizes_first() {
        let keywords = extract_keywords(r"{\rtf1\ansi\pard Lovely biryani\par}", 10);
        assert_eq!(keywords, vec!["lovely", "biryani"]);
    }

    #[test]
    fn test_zero_max_and_empty_text() {
        assert!(extract_keywords("tasty tasty noodles", 0).is_empty());
        assert!(extract_keywords("", 5).is_empty());
    }

    proptest! {
        #[test]
        fn prop_keyword_cap_and_shape(text in ".{0,200}", max in 0usize..12) {
            let keywords = extract_keywords(&text, max);
            prop_assert!(keywords.len() <= max);
            for keyword in &keywords {
                prop_assert!(keyword.chars().count() >= 3);
                prop_assert!(keyword.chars().all(char::is_alphabetic));
                prop_assert!(!is_stopword(keyword));
            }
        }
    }
}
