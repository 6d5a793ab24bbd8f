//! Lightweight review language guess.
//!
//! Counts whole-word hits against a handful of very common words per
//! language. Good enough to tag a review; not a real detector.

use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_LANGUAGE: &str = "en";

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{M}]+").unwrap());

const COMMON_WORDS: [(&str, &[&str]); 4] = [
    ("en", &["the", "and", "is", "was", "are", "were", "this", "that", "with", "for"]),
    ("es", &["el", "la", "de", "que", "y", "en", "un", "es", "se", "no"]),
    ("fr", &["le", "de", "et", "à", "un", "il", "être", "en", "avoir", "les"]),
    ("hi", &["की", "के", "है", "में", "को", "से", "पर", "या", "एक", "नहीं"]),
];

/// Best-guess ISO 639-1 code for `text`; `"en"` when nothing stands out.
pub fn detect_language(text: &str) -> &'static str {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = WORD.find_iter(&lowered).map(|m| m.as_str()).collect();

    let mut best = (DEFAULT_LANGUAGE, 0usize);
    for (code, common) in COMMON_WORDS {
        let hits = words.iter().filter(|w| common.contains(w)).count();
        // Strictly greater: earlier languages win ties.
        if hits > best.1 {
            best = (code, hits);
        }
    }
    best.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_english() {
        assert_eq!(detect_language("The food was great and the staff is friendly"), "en");
    }

    #[test]
    fn test_detects_spanish() {
        assert_eq!(detect_language("La comida de este lugar es muy buena y el servicio rápido"), "es");
    }

    #[test]
    fn test_detects_french() {
        assert_eq!(detect_language("Le plat était délicieux et le service il faut le dire"), "fr");
    }

    #[test]
    fn test_detects_hindi() {
        assert_eq!(detect_language("खाना बहुत अच्छा है और सेवा में कोई कमी नहीं"), "hi");
    }

    #[test]
    fn test_defaults_to_english() {
        assert_eq!(detect_language(""), "en");
        assert_eq!(detect_language("Yum!!"), "en");
    }

    #[test]
    fn test_substrings_do_not_count() {
        // "el" inside "excellent" is not a Spanish hit.
        assert_eq!(detect_language("Excellent excellent excellent"), "en");
    }
}
