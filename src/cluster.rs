//! Rule-derived cluster labels.
//!
//! Labels are not computed groupings: each review gets exactly one label from
//! an ordered cascade of guards over its sentiment vector. The first guard
//! that holds wins, so [`CLUSTER_RULES`] order is the contract.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::sentiment::{Sentiment, SentimentVector};

/// The closed set of cluster labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ClusterLabel {
    #[serde(rename = "Strongly Positive Experience")]
    StronglyPositive,
    #[serde(rename = "Strongly Negative Experience")]
    StronglyNegative,
    #[serde(rename = "Taste Praise")]
    TastePraise,
    #[serde(rename = "Taste Issues")]
    TasteIssues,
    #[serde(rename = "Service Praise")]
    ServicePraise,
    #[serde(rename = "Service Issues")]
    ServiceIssues,
    #[serde(rename = "Ambience Praise")]
    AmbiencePraise,
    #[serde(rename = "Ambience Problems")]
    AmbienceProblems,
    #[serde(rename = "Hygiene Problems")]
    HygieneProblems,
    #[serde(rename = "Delivery Praise")]
    DeliveryPraise,
    #[serde(rename = "Delivery Delay")]
    DeliveryDelay,
    #[serde(rename = "Mixed Feedback")]
    MixedFeedback,
    #[serde(rename = "General Feedback")]
    GeneralFeedback,
}

impl ClusterLabel {
    pub const ALL: [ClusterLabel; 13] = [
        ClusterLabel::StronglyPositive,
        ClusterLabel::StronglyNegative,
        ClusterLabel::TastePraise,
        ClusterLabel::TasteIssues,
        ClusterLabel::ServicePraise,
        ClusterLabel::ServiceIssues,
        ClusterLabel::AmbiencePraise,
        ClusterLabel::AmbienceProblems,
        ClusterLabel::HygieneProblems,
        ClusterLabel::DeliveryPraise,
        ClusterLabel::DeliveryDelay,
        ClusterLabel::MixedFeedback,
        ClusterLabel::GeneralFeedback,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterLabel::StronglyPositive => "Strongly Positive Experience",
            ClusterLabel::StronglyNegative => "Strongly Negative Experience",
            ClusterLabel::TastePraise => "Taste Praise",
            ClusterLabel::TasteIssues => "Taste Issues",
            ClusterLabel::ServicePraise => "Service Praise",
            ClusterLabel::ServiceIssues => "Service Issues",
            ClusterLabel::AmbiencePraise => "Ambience Praise",
            ClusterLabel::AmbienceProblems => "Ambience Problems",
            ClusterLabel::HygieneProblems => "Hygiene Problems",
            ClusterLabel::DeliveryPraise => "Delivery Praise",
            ClusterLabel::DeliveryDelay => "Delivery Delay",
            ClusterLabel::MixedFeedback => "Mixed Feedback",
            ClusterLabel::GeneralFeedback => "General Feedback",
        }
    }

    /// Look up a label by its display string, ignoring case and surrounding whitespace.
    pub fn from_label(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(raw))
    }

    /// Whether an externally supplied label is a generic stand-in that should
    /// be replaced by a derived one.
    pub fn is_placeholder(raw: &str) -> bool {
        let raw = raw.trim();
        raw.is_empty()
            || raw.eq_ignore_ascii_case("uncategorized")
            || raw.eq_ignore_ascii_case(ClusterLabel::GeneralFeedback.as_str())
    }
}

impl std::fmt::Display for ClusterLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type ClusterRule = (fn(&SentimentVector) -> bool, ClusterLabel);

fn leans_positive(s: Sentiment) -> bool {
    s.is_positive_leaning()
}

fn leans_negative(s: Sentiment) -> bool {
    s.is_negative_leaning()
}

fn strongly_positive(v: &SentimentVector) -> bool {
    v.overall == Sentiment::VeryPositive
        || (v.overall == Sentiment::Positive
            && [v.taste, v.service, v.ambience].into_iter().all(leans_positive))
}

fn strongly_negative(v: &SentimentVector) -> bool {
    v.overall == Sentiment::VeryNegative
        || (v.overall == Sentiment::Negative
            && [v.taste, v.service, v.hygiene].into_iter().any(leans_negative))
}

fn mixed(v: &SentimentVector) -> bool {
    let aspects = v.aspects();
    aspects.into_iter().any(leans_positive) && aspects.into_iter().any(leans_negative)
}

fn taste_praise(v: &SentimentVector) -> bool {
    leans_positive(v.taste)
}

fn taste_issues(v: &SentimentVector) -> bool {
    leans_negative(v.taste)
}

fn service_praise(v: &SentimentVector) -> bool {
    leans_positive(v.service)
}

fn service_issues(v: &SentimentVector) -> bool {
    leans_negative(v.service)
}

fn ambience_praise(v: &SentimentVector) -> bool {
    leans_positive(v.ambience)
}

fn ambience_problems(v: &SentimentVector) -> bool {
    leans_negative(v.ambience)
}

fn hygiene_problems(v: &SentimentVector) -> bool {
    leans_negative(v.hygiene)
}

fn delivery_praise(v: &SentimentVector) -> bool {
    leans_positive(v.delivery)
}

fn delivery_delay(v: &SentimentVector) -> bool {
    leans_negative(v.delivery)
}

/// Ordered cascade; `GeneralFeedback` applies when no rule matches.
pub const CLUSTER_RULES: [ClusterRule; 12] = [
    (strongly_positive, ClusterLabel::StronglyPositive),
    (strongly_negative, ClusterLabel::StronglyNegative),
    (taste_praise, ClusterLabel::TastePraise),
    (taste_issues, ClusterLabel::TasteIssues),
    (service_praise, ClusterLabel::ServicePraise),
    (service_issues, ClusterLabel::ServiceIssues),
    (ambience_praise, ClusterLabel::AmbiencePraise),
    (ambience_problems, ClusterLabel::AmbienceProblems),
    (hygiene_problems, ClusterLabel::HygieneProblems),
    (delivery_praise, ClusterLabel::DeliveryPraise),
    (delivery_delay, ClusterLabel::DeliveryDelay),
    (mixed, ClusterLabel::MixedFeedback),
];

/// Assign the cluster label for a sentiment vector.
pub fn label_cluster(sentiment: &SentimentVector) -> ClusterLabel {
    CLUSTER_RULES
        .iter()
        .find(|(applies, _)| applies(sentiment))
        .map(|(_, label)| *label)
        .unwrap_or(ClusterLabel::GeneralFeedback)
}
