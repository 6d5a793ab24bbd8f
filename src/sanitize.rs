//! Review text sanitization.
//!
//! Strips rich-text (RTF) preambles and control words, brace/bracket
//! artifacts, control and zero-width characters, and collapses whitespace
//! and runaway punctuation. The output is single-spaced plain text.

use once_cell::sync::Lazy;
use regex::Regex;

// Longest alternatives first so `\pardpard` is not split into `\pard` + `pard`.
static RTF_PREAMBLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\\pardpard|\\cocoaplatform|\\colortbl|\\rtf1|\\ansi|\\pard").unwrap()
});
static CONTROL_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\\[a-z]+\d*\s*").unwrap());
static BRACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[{}]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static BANGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"!{3,}").unwrap());
static QUESTIONS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\?{3,}").unwrap());
static ELLIPSIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{4,}").unwrap());
static BRACKETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\[\]]").unwrap());
static INVISIBLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x00-\x1F\x7F-\x9F\x{200B}-\x{200D}\x{2060}\x{FEFF}]").unwrap()
});

/// Clean raw review text.
///
/// Empty input yields an empty string. The rule pipeline is re-applied until
/// the text stops changing, so `sanitize(sanitize(x)) == sanitize(x)`.
pub fn sanitize(raw: &str) -> String {
    let mut current = clean_pass(raw);
    loop {
        let next = clean_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

// A single ordered pass; no rule ever lengthens the text.
fn clean_pass(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let cleaned = RTF_PREAMBLE.replace_all(text, "");
    let cleaned = CONTROL_WORD.replace_all(&cleaned, "");
    let cleaned = BRACES.replace_all(&cleaned, "");
    let cleaned = WHITESPACE.replace_all(&cleaned, " ");
    let cleaned = BANGS.replace_all(&cleaned, "!!");
    let cleaned = QUESTIONS.replace_all(&cleaned, "??");
    let cleaned = ELLIPSIS.replace_all(&cleaned, "...");
    let cleaned = BRACKETS.replace_all(&cleaned, "");
    let cleaned = INVISIBLE.replace_all(&cleaned, "");

    WHITESPACE.replace_all(cleaned.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strips_rtf_document() {
        let raw = r"{\rtf1\ansi\pard The food was great\par}";
        assert_eq!(sanitize(raw), "The food was great");

        let with_font_table = r"{\rtf1 {\fonttbl\f0\fswiss Helvetica;}\f0\fs24 Nice staff}";
        assert_eq!(sanitize(with_font_table), "Helvetica;Nice staff");
    }

    #[test]
    fn test_preamble_is_case_insensitive() {
        assert_eq!(sanitize(r"\RTF1 \PARDPARD Lovely place"), "Lovely place");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(sanitize("  The\tfood\r\n\n was   fine  "), "The food was fine");
    }

    #[test]
    fn test_collapses_punctuation_runs() {
        assert_eq!(sanitize("Wow!!!!! Really????? Hmm......"), "Wow!! Really?? Hmm...");
        assert_eq!(sanitize("Fine!! ok?? and..."), "Fine!! ok?? and...");
    }

    #[test]
    fn test_removes_brackets_and_braces() {
        assert_eq!(sanitize("[Great] {service}"), "Great service");
    }

    #[test]
    fn test_removes_control_and_zero_width() {
        assert_eq!(sanitize("tas\u{200B}ty\u{0007} fo\u{FEFF}od\u{009C}"), "tasty food");
    }

    #[test]
    fn test_exposed_noise_is_collapsed() {
        // Removing the bracket exposes a run of three bangs.
        assert_eq!(sanitize("Great!![!"), "Great!!");
        // Removing the control char exposes a control word.
        assert_eq!(sanitize("\\\u{0001}b12 nice"), "nice");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("   \n\t "), "");
        assert_eq!(sanitize("{}[]"), "");
    }

    proptest! {
        #[test]
        fn prop_sanitize_is_idempotent(raw in ".*") {
            let once = sanitize(&raw);
            prop_assert_eq!(sanitize(&once), once);
        }

        #[test]
        fn prop_output_has_no_noise(raw in ".*") {
            let out = sanitize(&raw);
            prop_assert!(!out.contains("  "));
            prop_assert!(!out.chars().any(|c| c.is_control()));
            let has_brackets = out.contains(&['{', '}', '[', ']'][..]);
            prop_assert!(!has_brackets);
            prop_assert_eq!(out.trim(), out.as_str());
        }
    }
}
