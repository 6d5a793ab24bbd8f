//! Heuristic multi-aspect sentiment classifier.
//!
//! Lexicon-based, no model: the overall reading comes from the first lexicon
//! (in priority order) with any substring hit, and each aspect inherits it
//! when the text mentions that aspect at all.

use crate::sentiment::{Aspect, Sentiment, SentimentVector};

const VERY_POSITIVE_WORDS: &[&str] = &[
    "excellent", "amazing", "fantastic", "outstanding", "perfect", "brilliant", "superb",
    "exceptional", "wonderful", "delicious", "best ever",
];

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "nice", "love", "enjoyed", "satisfied", "happy", "pleased", "recommend",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "poor", "terrible", "awful", "disappointed", "worst", "horrible", "disgusting",
    "unacceptable",
];

const VERY_NEGATIVE_WORDS: &[&str] = &[
    "worst", "terrible", "horrible", "disgusting", "inedible", "unacceptable", "never again",
    "waste of money",
];

/// Lexicons in priority order. Negative cues outrank positive ones so that a
/// review mixing "excellent" and "terrible" is flagged.
const OVERALL_LEXICONS: [(Sentiment, &[&str]); 4] = [
    (Sentiment::VeryNegative, VERY_NEGATIVE_WORDS),
    (Sentiment::VeryPositive, VERY_POSITIVE_WORDS),
    (Sentiment::Negative, NEGATIVE_WORDS),
    (Sentiment::Positive, POSITIVE_WORDS),
];

fn topic_indicators(aspect: Aspect) -> &'static [&'static str] {
    match aspect {
        Aspect::Taste => &["food", "taste", "dish", "meal"],
        Aspect::Service => &["service", "staff", "waiter", "server"],
        Aspect::Ambience => &["ambience", "atmosphere", "environment", "place"],
        Aspect::Hygiene => &["clean", "hygiene", "dirty", "unclean"],
        Aspect::Delivery => &["delivery", "delivered", "takeout"],
    }
}

fn mentions_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

/// Overall sentiment of already-sanitized text.
pub fn overall_sentiment(sanitized: &str) -> Sentiment {
    let lowered = sanitized.to_lowercase();
    OVERALL_LEXICONS
        .iter()
        .find(|(_, words)| mentions_any(&lowered, words))
        .map(|(sentiment, _)| *sentiment)
        .unwrap_or(Sentiment::Neutral)
}

/// Score the five aspects and the overall sentiment of sanitized review text.
///
/// Aspects the text never mentions stay neutral. Hygiene, once mentioned, is
/// either positive (when the overall reading is positive-leaning) or negative.
pub fn classify(sanitized: &str) -> SentimentVector {
    let lowered = sanitized.to_lowercase();
    let overall = overall_sentiment(&lowered);

    let mut vector = SentimentVector {
        overall,
        ..SentimentVector::default()
    };

    for aspect in Aspect::ALL {
        if !mentions_any(&lowered, topic_indicators(aspect)) {
            continue;
        }
        let value = match aspect {
            Aspect::Hygiene if overall.is_positive_leaning() => Sentiment::Positive,
            Aspect::Hygiene => Sentiment::Negative,
            _ => overall,
        };
        vector.set_aspect(aspect, value);
    }

    vector
}
