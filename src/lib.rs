//! Restaurant review analytics.
//!
//! Raw review text flows through [`sanitize`], the lexicon [`classifier`],
//! the weighted [`rating`] and the [`cluster`] rule cascade into one
//! [`AnalysisResult`]. Stored results are folded into dashboards by
//! [`aggregate`]. An optional external analyzer (Gemini) can supply the
//! analysis instead; its output is normalized and any failure falls back to
//! the heuristic path.

pub mod aggregate;
pub mod analyzer;
pub mod api;
pub mod classifier;
pub mod cluster;
pub mod config;
pub mod error;
pub mod external;
pub mod gemini;
pub mod keywords;
pub mod language;
pub mod rating;
pub mod sanitize;
pub mod sentiment;
pub mod store;
pub mod worker;

pub use aggregate::{aggregate_clusters, aggregate_keywords, ClusterSummary, KeywordCount};
pub use analyzer::{AnalysisResult, ReviewAnalyzer};
pub use classifier::classify;
pub use cluster::{label_cluster, ClusterLabel};
pub use error::{AnalysisError, ExternalServiceError};
pub use external::ExternalAnalyzer;
pub use keywords::extract_keywords;
pub use rating::calculate_rating;
pub use sanitize::sanitize;
pub use sentiment::{Sentiment, SentimentVector};
