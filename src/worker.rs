//! Bulk review ingestion.
//!
//! Splits an uploaded text body into one review per line, analyzes them with
//! bounded concurrency and stores every successful result.

use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::analyzer::ReviewAnalyzer;
use crate::error::{MAX_REVIEW_CHARS, MIN_REVIEW_CHARS};
use crate::store::{ReviewStore, StoredReview};

/// Lines of this many characters or fewer are skipped.
pub const MIN_BULK_LINE_CHARS: usize = 10;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngestFailure {
    /// Zero-based position among the submitted lines.
    pub index: usize,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngestReport {
    pub submitted: usize,
    pub created: usize,
    pub failed: usize,
    pub ids: Vec<String>,
    pub failures: Vec<IngestFailure>,
}

/// Length rule shared by single and bulk submissions, on trimmed text.
pub fn check_review_length(text: &str) -> Result<(), String> {
    let length = text.trim().chars().count();
    if (MIN_REVIEW_CHARS..=MAX_REVIEW_CHARS).contains(&length) {
        Ok(())
    } else {
        Err(format!(
            "Review text must be between {MIN_REVIEW_CHARS} and {MAX_REVIEW_CHARS} characters"
        ))
    }
}

/// One review per non-trivial line of `body`, trimmed.
pub fn split_reviews(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > MIN_BULK_LINE_CHARS)
        .map(str::to_string)
        .collect()
}

pub async fn ingest_reviews(
    analyzer: &ReviewAnalyzer,
    store: &ReviewStore,
    texts: Vec<String>,
    concurrency: usize,
) -> IngestReport {
    let rejections: Vec<Option<String>> = texts.iter().map(|t| check_review_length(t).err()).collect();
    let accepted: Vec<String> = texts
        .iter()
        .zip(&rejections)
        .filter(|(_, rejection)| rejection.is_none())
        .map(|(text, _)| text.clone())
        .collect();

    // One analysis per accepted text, in order.
    let mut analyses = analyzer.analyze_batch(accepted, concurrency).await.into_iter();

    let mut ids = Vec::new();
    let mut failures = Vec::new();
    for (index, (text, rejection)) in texts.iter().zip(rejections).enumerate() {
        let outcome = match rejection {
            Some(reason) => Err(reason),
            None => match analyses.next() {
                Some(result) => result.map_err(|err| err.to_string()),
                None => Err("analysis result missing".to_string()),
            },
        };

        let stored = outcome.and_then(|analysis| {
            store
                .insert(StoredReview::new(text.as_str(), analysis))
                .ok_or_else(|| "review store unavailable".to_string())
        });

        match stored {
            Ok(review) => ids.push(review.id),
            Err(error) => {
                warn!(index, error = %error, "bulk review rejected");
                failures.push(IngestFailure { index, error });
            }
        }
    }

    info!(
        submitted = texts.len(),
        created = ids.len(),
        failed = failures.len(),
        "bulk ingestion finished"
    );

    IngestReport {
        submitted: texts.len(),
        created: ids.len(),
        failed: failures.len(),
        ids,
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_reviews() {
        let body = "Great food and friendly staff\n\nshort one\r\n   Delivery took two hours, cold pizza   \n0123456789";
        assert_eq!(
            split_reviews(body),
            vec!["Great food and friendly staff", "Delivery took two hours, cold pizza"]
        );
    }

    #[test]
    fn test_review_length_rule() {
        assert!(check_review_length("  Great food  ").is_ok());
        assert!(check_review_length("   ok   ").is_err());
        assert!(check_review_length(&"a".repeat(MAX_REVIEW_CHARS)).is_ok());
        assert!(check_review_length(&"a".repeat(MAX_REVIEW_CHARS + 1)).is_err());
    }

    #[tokio::test]
    async fn test_ingest_stores_successes_and_reports_failures() {
        let store = ReviewStore::new();
        let texts = vec![
            "Great food and friendly staff".to_string(),
            "{}{}{}{}{}{}[][]".to_string(),
            "Delivery took two hours, cold pizza".to_string(),
        ];

        let report = ingest_reviews(&ReviewAnalyzer::local(), &store, texts, 2).await;

        assert_eq!(report.submitted, 3);
        assert_eq!(report.created, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.failures[0].index, 1);
        assert_eq!(store.len(), 2);
        assert!(report.ids.iter().all(|id| store.snapshot().iter().any(|r| &r.id == id)));
    }

    #[tokio::test]
    async fn test_ingest_rejects_overlong_lines() {
        let store = ReviewStore::new();
        let overlong = "The food was lovely. ".repeat(1000);
        let body = format!("Great food and friendly staff\n{overlong}\nDelivery took two hours, cold pizza");
        let texts = split_reviews(&body);
        assert_eq!(texts.len(), 3);

        let report = ingest_reviews(&ReviewAnalyzer::local(), &store, texts, 2).await;

        assert_eq!(report.created, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.failures[0].index, 1);
        assert!(report.failures[0].error.contains("between 10 and 9000"));
        assert_eq!(store.len(), 2);
        assert!(store.snapshot().iter().all(|r| r.text.chars().count() <= MAX_REVIEW_CHARS));
    }
}
