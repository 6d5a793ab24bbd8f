//! Review analysis orchestrator.
//!
//! Composes sanitizer, classifier, rating, cluster labeler and keyword
//! extractor into one [`AnalysisResult`] per review. When an external
//! analyzer is configured its output is normalized through the same schema;
//! any external failure or timeout falls back to the heuristic path.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::classifier::classify;
use crate::cluster::{label_cluster, ClusterLabel};
use crate::error::{AnalysisError, ExternalServiceError, MIN_REVIEW_CHARS};
use crate::external::{ExternalAnalysis, ExternalAnalyzer};
use crate::keywords::extract_keywords;
use crate::language::detect_language;
use crate::rating::calculate_rating;
use crate::sanitize::sanitize;
use crate::sentiment::SentimentVector;

/// Upper bound on keywords kept from an external analysis.
pub const MAX_KEYWORDS: usize = 10;
/// Keywords extracted locally when no usable external keywords exist.
pub const LOCAL_KEYWORD_LIMIT: usize = 8;
pub const DEFAULT_EXTERNAL_TIMEOUT: Duration = Duration::from_secs(20);

/// Structured analysis of one review. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[schema(example = "The food was excellent, service was terrible and slow.")]
    pub clean_text: String,
    pub sentiment: SentimentVector,
    pub keywords: Vec<String>,
    pub cluster: ClusterLabel,
    #[schema(example = 3.5)]
    pub rating: f64,
    pub is_fake: bool,
    #[schema(example = "en")]
    pub language: String,
}

/// Heuristic analysis of already sanitized text.
pub fn analyze_locally(clean_text: &str) -> AnalysisResult {
    let sentiment = classify(clean_text);

    AnalysisResult {
        clean_text: clean_text.to_string(),
        rating: calculate_rating(&sentiment),
        cluster: label_cluster(&sentiment),
        keywords: extract_keywords(clean_text, LOCAL_KEYWORD_LIMIT),
        is_fake: false,
        language: detect_language(clean_text).to_string(),
        sentiment,
    }
}

/// Validate and normalize an external analysis of `clean_text`.
///
/// Rating is always recomputed locally; cluster labels outside the closed
/// set, or placeholders, are re-derived from the normalized sentiment.
pub fn normalize_external(clean_text: &str, external: ExternalAnalysis) -> AnalysisResult {
    let clean_text = external
        .clean_text
        .as_deref()
        .map(sanitize)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| clean_text.to_string());

    let sentiment: SentimentVector = external.sentiment.normalize();

    let cluster = external
        .cluster_label
        .as_deref()
        .filter(|raw| !ClusterLabel::is_placeholder(raw))
        .and_then(ClusterLabel::from_label)
        .unwrap_or_else(|| label_cluster(&sentiment));

    let mut keywords: Vec<String> = external
        .keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| k.chars().count() > 2)
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect();
    if keywords.is_empty() {
        keywords = extract_keywords(&clean_text, LOCAL_KEYWORD_LIMIT);
    }

    let language = external
        .language
        .as_deref()
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(str::to_lowercase)
        .unwrap_or_else(|| detect_language(&clean_text).to_string());

    AnalysisResult {
        rating: calculate_rating(&sentiment),
        is_fake: external.is_fake_review.unwrap_or(false),
        clean_text,
        sentiment,
        keywords,
        cluster,
        language,
    }
}

/// Entry point for analyzing reviews.
#[derive(Clone)]
pub struct ReviewAnalyzer {
    external: Option<Arc<dyn ExternalAnalyzer>>,
    timeout: Duration,
}

impl Default for ReviewAnalyzer {
    fn default() -> Self {
        Self::local()
    }
}

impl std::fmt::Debug for ReviewAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewAnalyzer")
            .field("external", &self.external.as_ref().map(|e| e.name().to_string()))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ReviewAnalyzer {
    /// Heuristic-only analyzer.
    pub fn local() -> Self {
        Self {
            external: None,
            timeout: DEFAULT_EXTERNAL_TIMEOUT,
        }
    }

    pub fn with_external(external: Arc<dyn ExternalAnalyzer>, timeout: Duration) -> Self {
        Self {
            external: Some(external),
            timeout,
        }
    }

    pub fn has_external(&self) -> bool {
        self.external.is_some()
    }

    /// Analyze one raw review.
    ///
    /// Fails only when the sanitized text is shorter than
    /// [`MIN_REVIEW_CHARS`]; external failures are logged and recovered.
    pub async fn analyze(&self, raw: &str) -> Result<AnalysisResult, AnalysisError> {
        let clean = sanitize(raw);
        let length = clean.chars().count();
        if length < MIN_REVIEW_CHARS {
            return Err(AnalysisError::InputTooShort { length });
        }

        let Some(external) = &self.external else {
            return Ok(analyze_locally(&clean));
        };

        match self.call_external(external.as_ref(), &clean).await {
            Ok(analysis) => {
                debug!(analyzer = external.name(), "external analysis accepted");
                Ok(normalize_external(&clean, analysis))
            }
            Err(err) => {
                warn!(analyzer = external.name(), error = %err, "external analysis failed, using heuristic path");
                Ok(analyze_locally(&clean))
            }
        }
    }

    async fn call_external(
        &self,
        external: &dyn ExternalAnalyzer,
        clean: &str,
    ) -> Result<ExternalAnalysis, ExternalServiceError> {
        tokio::time::timeout(self.timeout, external.analyze_externally(clean))
            .await
            .map_err(|_| ExternalServiceError::Timeout(self.timeout))?
    }

    /// Analyze many reviews with at most `concurrency` in flight.
    ///
    /// Results are returned in input order.
    pub async fn analyze_batch(
        &self,
        texts: Vec<String>,
        concurrency: usize,
    ) -> Vec<Result<AnalysisResult, AnalysisError>> {
        stream::iter(texts)
            .map(|text| async move { self.analyze(&text).await })
            .buffered(concurrency.max(1))
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::{parse_external_payload, ExternalSentiment};
    use crate::sentiment::Sentiment;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const REVIEW: &str = "The food was excellent, service was terrible and slow.";

    struct Fixed(ExternalAnalysis);

    #[async_trait]
    impl ExternalAnalyzer for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn analyze_externally(&self, _: &str) -> Result<ExternalAnalysis, ExternalServiceError> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    #[async_trait]
    impl ExternalAnalyzer for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn analyze_externally(&self, _: &str) -> Result<ExternalAnalysis, ExternalServiceError> {
            Err(ExternalServiceError::Malformed("garbage".to_string()))
        }
    }

    struct Hanging(AtomicUsize);

    #[async_trait]
    impl ExternalAnalyzer for Hanging {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn analyze_externally(&self, _: &str) -> Result<ExternalAnalysis, ExternalServiceError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(ExternalAnalysis::default())
        }
    }

    #[tokio::test]
    async fn test_local_end_to_end() {
        let result = ReviewAnalyzer::local().analyze(REVIEW).await.unwrap();
        assert_eq!(result.sentiment.overall, Sentiment::VeryNegative);
        assert_eq!(result.sentiment.taste, Sentiment::VeryNegative);
        assert_eq!(result.sentiment.service, Sentiment::VeryNegative);
        assert_eq!(result.cluster, ClusterLabel::StronglyNegative);
        assert_eq!(result.clean_text, REVIEW);
        assert!(!result.is_fake);
        assert_eq!(result.language, "en");
        assert!(result.keywords.len() <= LOCAL_KEYWORD_LIMIT);
        assert!(result.keywords.contains(&"food".to_string()));
    }

    #[tokio::test]
    async fn test_too_short_input_is_rejected() {
        let err = ReviewAnalyzer::local().analyze("ok").await.unwrap_err();
        assert!(matches!(err, AnalysisError::InputTooShort { length: 2 }));

        // Noise does not count towards the length.
        let err = ReviewAnalyzer::local().analyze(r"{\rtf1\ansi\pard Meh\par}").await.unwrap_err();
        assert!(matches!(err, AnalysisError::InputTooShort { length: 3 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back_to_local() {
        let hanging = Arc::new(Hanging(AtomicUsize::new(0)));
        let analyzer = ReviewAnalyzer::with_external(hanging.clone(), Duration::from_secs(5));

        let result = analyzer.analyze(REVIEW).await.unwrap();
        assert_eq!(hanging.0.load(Ordering::SeqCst), 1);
        assert_eq!(result, analyze_locally(REVIEW));
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_local() {
        let analyzer = ReviewAnalyzer::with_external(Arc::new(Failing), Duration::from_secs(1));
        let result = analyzer.analyze(REVIEW).await.unwrap();
        assert_eq!(result, analyze_locally(REVIEW));
    }

    #[tokio::test]
    async fn test_external_result_is_normalized() {
        let payload = r#"```json
        {
            "cleanText": "{Great} biryani,   rude waiter",
            "sentiment": {"taste": "Very Positive", "service": "awful", "overall": "positive"},
            "keywords": ["  biryani ", "ok", 7, "waiter", "a", "spice"],
            "clusterLabel": "Noise Complaints",
            "language": "EN",
            "rating": 1
        }
        ```"#;
        let external = parse_external_payload(payload).unwrap();
        let analyzer = ReviewAnalyzer::with_external(Arc::new(Fixed(external)), Duration::from_secs(1));

        let result = analyzer.analyze(REVIEW).await.unwrap();
        assert_eq!(result.clean_text, "Great biryani, rude waiter");
        assert_eq!(result.sentiment.taste, Sentiment::VeryPositive);
        assert_eq!(result.sentiment.service, Sentiment::Neutral);
        assert_eq!(result.sentiment.hygiene, Sentiment::Neutral);
        assert_eq!(result.keywords, vec!["biryani", "waiter", "spice"]);
        // Out-of-set label is re-derived; rating is recomputed locally.
        assert_eq!(result.cluster, ClusterLabel::TastePraise);
        assert_eq!(result.rating, calculate_rating(&result.sentiment));
        assert_eq!(result.language, "en");
        assert!(!result.is_fake);
    }

    #[test]
    fn test_external_known_label_is_kept() {
        let external = ExternalAnalysis {
            cluster_label: Some("delivery delay".to_string()),
            is_fake_review: Some(true),
            ..Default::default()
        };
        let result = normalize_external(REVIEW, external);
        assert_eq!(result.cluster, ClusterLabel::DeliveryDelay);
        assert!(result.is_fake);
    }

    #[test]
    fn test_external_placeholder_label_is_rederived() {
        let external = ExternalAnalysis {
            sentiment: ExternalSentiment {
                overall: Some("very_positive".to_string()),
                ..Default::default()
            },
            cluster_label: Some("General Feedback".to_string()),
            ..Default::default()
        };
        let result = normalize_external(REVIEW, external);
        assert_eq!(result.cluster, ClusterLabel::StronglyPositive);
    }

    #[test]
    fn test_empty_external_fields_fall_back() {
        let external = ExternalAnalysis {
            clean_text: Some("{ }".to_string()),
            keywords: vec!["ok".to_string(), " ".to_string()],
            language: Some("  ".to_string()),
            ..Default::default()
        };
        let result = normalize_external(REVIEW, external);
        assert_eq!(result.clean_text, REVIEW);
        assert_eq!(result.keywords, extract_keywords(REVIEW, LOCAL_KEYWORD_LIMIT));
        assert_eq!(result.language, "en");
        assert_eq!(result.sentiment, SentimentVector::default());
        assert_eq!(result.cluster, ClusterLabel::GeneralFeedback);
    }

    #[test]
    fn test_external_keywords_are_capped() {
        let external = ExternalAnalysis {
            keywords: (0..15).map(|i| format!("keyword{i}")).collect(),
            ..Default::default()
        };
        let result = normalize_external(REVIEW, external);
        assert_eq!(result.keywords.len(), MAX_KEYWORDS);
        assert_eq!(result.keywords[0], "keyword0");
    }

    #[tokio::test]
    async fn test_batch_keeps_input_order() {
        let texts = vec![
            "Lovely ambience and friendly staff".to_string(),
            "bad".to_string(),
            "Delivery was late and the food was cold".to_string(),
        ];
        let results = ReviewAnalyzer::local().analyze_batch(texts.clone(), 2).await;

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(AnalysisError::InputTooShort { .. })));
        let third = results[2].as_ref().unwrap();
        assert_eq!(third.clean_text, texts[2]);
    }

    #[tokio::test]
    async fn test_batch_runs_on_spawned_task() {
        let analyzer = ReviewAnalyzer::local();
        let texts = vec!["Lovely ambience and friendly staff".to_string()];

        let handle = tokio::spawn(async move { analyzer.analyze_batch(texts, 4).await });
        let results = handle.await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_ok());
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let json = serde_json::to_value(analyze_locally(REVIEW)).unwrap();
        assert_eq!(json["cluster"], "Strongly Negative Experience");
        assert_eq!(json["isFake"], false);
        assert!(json["cleanText"].is_string());
        assert_eq!(json["sentiment"]["overall"], "very_negative");
    }
}
