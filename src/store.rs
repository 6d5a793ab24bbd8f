//! In-memory review store.
//!
//! Holds analyzed reviews for the HTTP service. Listing supports filters,
//! sorting and pagination; aggregation reads a cloned snapshot.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::aggregate::CorpusEntry;
use crate::analyzer::AnalysisResult;
use crate::sentiment::Sentiment;

pub const DEFAULT_PAGE_LIMIT: usize = 50;
pub const MAX_PAGE_LIMIT: usize = 500;

/// An analyzed review as kept by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredReview {
    #[schema(example = "5b0c3f0e-8d55-4b8b-9a53-1f6c5e0f6a10")]
    pub id: String,
    /// Text as submitted, trimmed.
    pub text: String,
    #[serde(flatten)]
    pub analysis: AnalysisResult,
    pub created_at: DateTime<Utc>,
}

impl StoredReview {
    pub fn new(text: impl Into<String>, analysis: AnalysisResult) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            analysis,
            created_at: Utc::now(),
        }
    }
}

impl CorpusEntry for StoredReview {
    fn cluster(&self) -> Option<&str> {
        Some(self.analysis.cluster.as_str())
    }

    fn rating(&self) -> Option<f64> {
        Some(self.analysis.rating)
    }

    fn overall(&self) -> Option<Sentiment> {
        Some(self.analysis.sentiment.overall)
    }

    fn keywords(&self) -> &[String] {
        &self.analysis.keywords
    }

    fn is_fake(&self) -> bool {
        self.analysis.is_fake
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }
}

/// Listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewSort {
    #[default]
    NewestFirst,
    OldestFirst,
    HighestRated,
    LowestRated,
}

impl ReviewSort {
    /// Parse `-createdAt`, `createdAt`, `-rating` or `rating`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "-createdAt" => Some(ReviewSort::NewestFirst),
            "createdAt" => Some(ReviewSort::OldestFirst),
            "-rating" => Some(ReviewSort::HighestRated),
            "rating" => Some(ReviewSort::LowestRated),
            _ => None,
        }
    }

    fn apply(&self, reviews: &mut [StoredReview]) {
        match self {
            ReviewSort::NewestFirst => reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            ReviewSort::OldestFirst => reviews.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            ReviewSort::HighestRated => {
                reviews.sort_by(|a, b| b.analysis.rating.total_cmp(&a.analysis.rating))
            }
            ReviewSort::LowestRated => {
                reviews.sort_by(|a, b| a.analysis.rating.total_cmp(&b.analysis.rating))
            }
        }
    }
}

/// Filters and paging for [`ReviewStore::list`]. Pages start at 1.
#[derive(Debug, Clone, Default)]
pub struct ReviewQuery {
    pub page: usize,
    pub limit: usize,
    pub cluster: Option<String>,
    pub is_fake: Option<bool>,
    pub sort: ReviewSort,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
}

#[derive(Debug, Clone)]
pub struct ReviewPage {
    pub reviews: Vec<StoredReview>,
    pub pagination: Pagination,
}

#[derive(Default)]
pub struct ReviewStore {
    reviews: RwLock<Vec<StoredReview>>,
}

impl ReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a review; `None` when the store lock is poisoned.
    pub fn insert(&self, review: StoredReview) -> Option<StoredReview> {
        match self.reviews.write() {
            Ok(mut reviews) => {
                reviews.push(review.clone());
                Some(review)
            }
            Err(_) => {
                warn!(review_id = %review.id, "review store lock poisoned, review not stored");
                None
            }
        }
    }

    /// Filter, sort and page the stored reviews.
    pub fn list(&self, query: &ReviewQuery) -> ReviewPage {
        let page = query.page.max(1);
        let limit = match query.limit {
            0 => DEFAULT_PAGE_LIMIT,
            n => n.min(MAX_PAGE_LIMIT),
        };

        let mut matching: Vec<StoredReview> = self
            .snapshot()
            .into_iter()
            .filter(|r| {
                query
                    .cluster
                    .as_deref()
                    .map_or(true, |c| r.analysis.cluster.as_str() == c)
            })
            .filter(|r| query.is_fake.map_or(true, |f| r.analysis.is_fake == f))
            .collect();
        query.sort.apply(&mut matching);

        let total = matching.len();
        let reviews = matching
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        ReviewPage {
            reviews,
            pagination: Pagination {
                page,
                limit,
                total,
                pages: total.div_ceil(limit),
            },
        }
    }

    /// Remove a review; false when the id is unknown.
    pub fn delete(&self, id: &str) -> bool {
        if let Ok(mut reviews) = self.reviews.write() {
            let before_len = reviews.len();
            reviews.retain(|r| r.id != id);
            if reviews.len() < before_len {
                info!(review_id = id, "review deleted");
                return true;
            }
        }
        false
    }

    pub fn snapshot(&self) -> Vec<StoredReview> {
        self.reviews.read().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.reviews.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze_locally;
    use crate::cluster::ClusterLabel;
    use chrono::{Duration, TimeZone};

    fn review(text: &str, minutes: i64) -> StoredReview {
        let mut review = StoredReview::new(text, analyze_locally(text));
        review.created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes);
        review
    }

    fn seeded() -> ReviewStore {
        let store = ReviewStore::new();
        store.insert(review("The food was excellent and the staff friendly", 0));
        store.insert(review("Terrible service, waited an hour", 1));
        store.insert(review("Lovely atmosphere for a quiet dinner", 2));
        store
    }

    #[test]
    fn test_default_sort_is_newest_first() {
        let page = seeded().list(&ReviewQuery::default());
        assert_eq!(page.reviews.len(), 3);
        assert_eq!(page.reviews[0].text, "Lovely atmosphere for a quiet dinner");
        assert_eq!(page.pagination.limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(page.pagination.page, 1);
        assert_eq!(page.pagination.pages, 1);
    }

    #[test]
    fn test_sort_by_rating() {
        let store = seeded();
        let query = ReviewQuery { sort: ReviewSort::LowestRated, ..Default::default() };
        let ratings: Vec<f64> = store.list(&query).reviews.iter().map(|r| r.analysis.rating).collect();
        assert!(ratings.windows(2).all(|w| w[0] <= w[1]));

        assert_eq!(ReviewSort::parse("-rating"), Some(ReviewSort::HighestRated));
        assert_eq!(ReviewSort::parse("bogus"), None);
    }

    #[test]
    fn test_pagination() {
        let store = seeded();
        let query = ReviewQuery { page: 2, limit: 2, sort: ReviewSort::OldestFirst, ..Default::default() };
        let page = store.list(&query);

        assert_eq!(page.reviews.len(), 1);
        assert_eq!(page.reviews[0].text, "Lovely atmosphere for a quiet dinner");
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.pagination.pages, 2);

        let beyond = store.list(&ReviewQuery { page: 9, limit: 2, ..Default::default() });
        assert!(beyond.reviews.is_empty());
    }

    #[test]
    fn test_filters() {
        let store = seeded();
        let cluster = store.snapshot()[1].analysis.cluster;
        let query = ReviewQuery { cluster: Some(cluster.to_string()), ..Default::default() };
        let page = store.list(&query);
        assert!(page.reviews.iter().all(|r| r.analysis.cluster == cluster));
        assert!(!page.reviews.is_empty());

        let fakes = store.list(&ReviewQuery { is_fake: Some(true), ..Default::default() });
        assert_eq!(fakes.pagination.total, 0);

        let none = store.list(&ReviewQuery {
            cluster: Some(ClusterLabel::MixedFeedback.to_string()),
            ..Default::default()
        });
        assert!(none.reviews.is_empty());
    }

    #[test]
    fn test_insert_into_poisoned_store_fails() {
        let store = std::sync::Arc::new(seeded());
        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.reviews.write().unwrap();
            panic!("writer crashed");
        })
        .join();

        assert!(store.insert(review("Quiet room and friendly staff", 5)).is_none());
    }

    #[test]
    fn test_delete() {
        let store = seeded();
        let id = store.snapshot()[0].id.clone();
        assert!(store.delete(&id));
        assert!(!store.delete(&id));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_stored_review_json_is_flat() {
        let json = serde_json::to_value(review("The food was excellent and the staff friendly", 0)).unwrap();
        assert!(json["id"].is_string());
        assert!(json["cleanText"].is_string());
        assert!(json["rating"].is_number());
        assert!(json["createdAt"].is_string());
        assert!(json.get("analysis").is_none());
    }
}
