//! Sentiment categories and the per-review sentiment vector.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Five-point ordered sentiment scale.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    VeryNegative,
    Negative,
    #[default]
    Neutral,
    Positive,
    VeryPositive,
}

impl Sentiment {
    pub const ALL: [Sentiment; 5] = [
        Sentiment::VeryNegative,
        Sentiment::Negative,
        Sentiment::Neutral,
        Sentiment::Positive,
        Sentiment::VeryPositive,
    ];

    /// Map a free-form label onto the scale; anything unrecognized is `Neutral`.
    pub fn normalize(raw: &str) -> Self {
        let key = raw.trim().to_lowercase().replace(&['-', ' '][..], "_");
        match key.as_str() {
            "very_negative" => Sentiment::VeryNegative,
            "negative" => Sentiment::Negative,
            "positive" => Sentiment::Positive,
            "very_positive" => Sentiment::VeryPositive,
            _ => Sentiment::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::VeryNegative => "very_negative",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
            Sentiment::Positive => "positive",
            Sentiment::VeryPositive => "very_positive",
        }
    }

    /// Numeric score used by the rating calculator.
    pub fn score(&self) -> f64 {
        match self {
            Sentiment::VeryPositive => 1.0,
            Sentiment::Positive => 0.8,
            Sentiment::Neutral => 0.5,
            Sentiment::Negative => 0.3,
            Sentiment::VeryNegative => 0.1,
        }
    }

    pub fn is_positive_leaning(&self) -> bool {
        matches!(self, Sentiment::Positive | Sentiment::VeryPositive)
    }

    pub fn is_negative_leaning(&self) -> bool {
        matches!(self, Sentiment::Negative | Sentiment::VeryNegative)
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentiment sub-dimension of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aspect {
    Taste,
    Service,
    Ambience,
    Hygiene,
    Delivery,
}

impl Aspect {
    pub const ALL: [Aspect; 5] = [
        Aspect::Taste,
        Aspect::Service,
        Aspect::Ambience,
        Aspect::Hygiene,
        Aspect::Delivery,
    ];
}

/// Per-review sentiment across the five aspects plus an overall reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct SentimentVector {
    #[serde(default)]
    pub taste: Sentiment,
    #[serde(default)]
    pub service: Sentiment,
    #[serde(default)]
    pub ambience: Sentiment,
    #[serde(default)]
    pub hygiene: Sentiment,
    #[serde(default)]
    pub delivery: Sentiment,
    #[serde(default)]
    pub overall: Sentiment,
}

impl SentimentVector {
    pub fn aspect(&self, aspect: Aspect) -> Sentiment {
        match aspect {
            Aspect::Taste => self.taste,
            Aspect::Service => self.service,
            Aspect::Ambience => self.ambience,
            Aspect::Hygiene => self.hygiene,
            Aspect::Delivery => self.delivery,
        }
    }

    pub fn set_aspect(&mut self, aspect: Aspect, value: Sentiment) {
        match aspect {
            Aspect::Taste => self.taste = value,
            Aspect::Service => self.service = value,
            Aspect::Ambience => self.ambience = value,
            Aspect::Hygiene => self.hygiene = value,
            Aspect::Delivery => self.delivery = value,
        }
    }

    /// The five aspect values, in `Aspect::ALL` order.
    pub fn aspects(&self) -> [Sentiment; 5] {
        Aspect::ALL.map(|a| self.aspect(a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_known_labels() {
        assert_eq!(Sentiment::normalize("very_positive"), Sentiment::VeryPositive);
        assert_eq!(Sentiment::normalize(" Negative "), Sentiment::Negative);
        assert_eq!(Sentiment::normalize("very-negative"), Sentiment::VeryNegative);
        assert_eq!(Sentiment::normalize("Very Positive"), Sentiment::VeryPositive);
    }

    #[test]
    fn test_normalize_unknown_is_neutral() {
        assert_eq!(Sentiment::normalize(""), Sentiment::Neutral);
        assert_eq!(Sentiment::normalize("ecstatic"), Sentiment::Neutral);
        assert_eq!(Sentiment::normalize("mixed"), Sentiment::Neutral);
    }

    #[test]
    fn test_ordering_and_leaning() {
        assert!(Sentiment::VeryNegative < Sentiment::Neutral);
        assert!(Sentiment::Positive < Sentiment::VeryPositive);
        assert!(Sentiment::VeryPositive.is_positive_leaning());
        assert!(!Sentiment::Neutral.is_positive_leaning());
        assert!(!Sentiment::Neutral.is_negative_leaning());
        assert!(Sentiment::Negative.is_negative_leaning());
    }

    #[test]
    fn test_serde_round_trip_uses_snake_case() {
        let json = serde_json::to_string(&Sentiment::VeryPositive).unwrap();
        assert_eq!(json, "\"very_positive\"");

        let vector: SentimentVector =
            serde_json::from_str(r#"{"taste":"positive","overall":"very_negative"}"#).unwrap();
        assert_eq!(vector.taste, Sentiment::Positive);
        assert_eq!(vector.service, Sentiment::Neutral);
        assert_eq!(vector.overall, Sentiment::VeryNegative);
    }

    #[test]
    fn test_aspect_accessors() {
        let mut vector = SentimentVector::default();
        vector.set_aspect(Aspect::Hygiene, Sentiment::Negative);
        assert_eq!(vector.aspect(Aspect::Hygiene), Sentiment::Negative);
        assert_eq!(
            vector.aspects(),
            [
                Sentiment::Neutral,
                Sentiment::Neutral,
                Sentiment::Neutral,
                Sentiment::Negative,
                Sentiment::Neutral
            ]
        );
    }
}
