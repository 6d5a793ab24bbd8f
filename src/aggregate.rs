//! Corpus-level aggregation over analyzed reviews.
//!
//! Everything here is a read-only fold over a snapshot. Entries may come from
//! storage with fields missing; those contribute zero rather than failing the
//! whole aggregate.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::analyzer::AnalysisResult;
use crate::cluster::ClusterLabel;
use crate::sentiment::Sentiment;

/// Group name for entries with no cluster label.
pub const UNCATEGORIZED: &str = "uncategorized";
pub const CLUSTER_MEMBER_LIMIT: usize = 50;

/// Read access to one analyzed review as seen by the aggregation layer.
pub trait CorpusEntry {
    fn cluster(&self) -> Option<&str>;
    fn rating(&self) -> Option<f64>;
    fn overall(&self) -> Option<Sentiment>;
    fn keywords(&self) -> &[String];

    fn is_fake(&self) -> bool {
        false
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

impl CorpusEntry for AnalysisResult {
    fn cluster(&self) -> Option<&str> {
        Some(self.cluster.as_str())
    }

    fn rating(&self) -> Option<f64> {
        Some(self.rating)
    }

    fn overall(&self) -> Option<Sentiment> {
        Some(self.sentiment.overall)
    }

    fn keywords(&self) -> &[String] {
        &self.keywords
    }

    fn is_fake(&self) -> bool {
        self.is_fake
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SentimentBreakdown {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentBreakdown {
    fn record(&mut self, overall: Option<Sentiment>) {
        match overall {
            Some(s) if s.is_positive_leaning() => self.positive += 1,
            Some(s) if s.is_negative_leaning() => self.negative += 1,
            Some(_) => self.neutral += 1,
            None => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSummary {
    #[schema(example = "Taste Praise")]
    pub label: String,
    pub count: usize,
    pub avg_rating: f64,
    pub sentiment_breakdown: SentimentBreakdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct KeywordCount {
    #[schema(example = "biryani")]
    pub keyword: String,
    pub count: usize,
}

/// Headline numbers for a corpus. Ratio is a percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CorpusMetrics {
    pub total: usize,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub avg_rating: f64,
    pub fake_count: usize,
    pub positive_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TrendPoint {
    #[schema(example = "2024-05-01")]
    pub date: String,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TrendPeriod {
    /// Last 7 days.
    Weekly,
    /// Last 12 calendar months.
    #[default]
    Monthly,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Group entries by cluster label in discovery order.
pub fn aggregate_clusters<E: CorpusEntry>(corpus: &[E]) -> Vec<ClusterSummary> {
    let mut groups: Vec<(String, usize, f64, SentimentBreakdown)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for entry in corpus {
        let label = entry.cluster().unwrap_or(UNCATEGORIZED);
        let slot = *index.entry(label).or_insert_with(|| {
            groups.push((label.to_string(), 0, 0.0, SentimentBreakdown::default()));
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.1 += 1;
        group.2 += entry.rating().unwrap_or(0.0);
        group.3.record(entry.overall());
    }

    groups
        .into_iter()
        .map(|(label, count, rating_sum, breakdown)| ClusterSummary {
            label,
            count,
            avg_rating: rating_sum / count as f64,
            sentiment_breakdown: breakdown,
        })
        .collect()
}

/// Labels of the `n` largest clusters; equal sizes keep discovery order.
pub fn top_clusters<E: CorpusEntry>(corpus: &[E], n: usize) -> Vec<String> {
    let mut summaries = aggregate_clusters(corpus);
    summaries.sort_by(|a, b| b.count.cmp(&a.count));
    summaries.into_iter().take(n).map(|s| s.label).collect()
}

/// Fold every entry's keywords into a frequency table.
///
/// Keywords are trimmed and lowercased; ties keep first-seen order.
pub fn aggregate_keywords<E: CorpusEntry>(corpus: &[E], limit: usize) -> Vec<KeywordCount> {
    let mut counts: Vec<KeywordCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for keyword in corpus.iter().flat_map(|e| e.keywords()) {
        let normalized = keyword.trim().to_lowercase();
        if normalized.is_empty() {
            continue;
        }
        match index.get(&normalized) {
            Some(&slot) => counts[slot].count += 1,
            None => {
                index.insert(normalized.clone(), counts.len());
                counts.push(KeywordCount { keyword: normalized, count: 1 });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

pub fn corpus_metrics<E: CorpusEntry>(corpus: &[E]) -> CorpusMetrics {
    let total = corpus.len();
    let mut breakdown = SentimentBreakdown::default();
    let mut rating_sum = 0.0;
    let mut fake_count = 0;

    for entry in corpus {
        breakdown.record(entry.overall());
        rating_sum += entry.rating().unwrap_or(0.0);
        if entry.is_fake() {
            fake_count += 1;
        }
    }

    let (avg_rating, positive_ratio) = if total > 0 {
        (
            round2(rating_sum / total as f64),
            round2(breakdown.positive as f64 / total as f64 * 100.0),
        )
    } else {
        (0.0, 0.0)
    };

    CorpusMetrics {
        total,
        positive: breakdown.positive,
        negative: breakdown.negative,
        neutral: total - breakdown.positive - breakdown.negative,
        avg_rating,
        fake_count,
        positive_ratio,
    }
}

fn trend_point<E: CorpusEntry>(
    corpus: &[E],
    date: String,
    in_bucket: impl Fn(DateTime<Utc>) -> bool,
) -> TrendPoint {
    let mut breakdown = SentimentBreakdown::default();
    let mut total = 0;

    for entry in corpus {
        if entry.created_at().is_some_and(&in_bucket) {
            total += 1;
            breakdown.record(entry.overall());
        }
    }

    TrendPoint {
        date,
        positive: breakdown.positive,
        negative: breakdown.negative,
        neutral: breakdown.neutral,
        total,
    }
}

/// One point per UTC day for the last `days` days, oldest first, ending on `now`.
pub fn daily_trend<E: CorpusEntry>(corpus: &[E], days: u32, now: DateTime<Utc>) -> Vec<TrendPoint> {
    let today = now.date_naive();

    (0..days)
        .rev()
        .map(|offset| {
            let day: NaiveDate = today - Duration::days(i64::from(offset));
            trend_point(corpus, day.format("%Y-%m-%d").to_string(), |at| at.date_naive() == day)
        })
        .collect()
}

/// One point per calendar month for the last `months` months, oldest first.
pub fn monthly_trend<E: CorpusEntry>(corpus: &[E], months: u32, now: DateTime<Utc>) -> Vec<TrendPoint> {
    let current = now.year() * 12 + now.month0() as i32;

    (0..months)
        .rev()
        .map(|offset| {
            let absolute = current - offset as i32;
            let (year, month) = (absolute.div_euclid(12), absolute.rem_euclid(12) as u32 + 1);
            trend_point(corpus, format!("{year:04}-{month:02}"), |at| {
                at.year() == year && at.month() == month
            })
        })
        .collect()
}

pub fn sentiment_trend<E: CorpusEntry>(
    corpus: &[E],
    period: TrendPeriod,
    now: DateTime<Utc>,
) -> Vec<TrendPoint> {
    match period {
        TrendPeriod::Weekly => daily_trend(corpus, 7, now),
        TrendPeriod::Monthly => monthly_trend(corpus, 12, now),
    }
}

/// Newest-first members of one cluster. Undated entries sort last.
pub fn cluster_members<'a, E: CorpusEntry>(corpus: &'a [E], label: &str, limit: usize) -> Vec<&'a E> {
    let mut members: Vec<&E> = corpus
        .iter()
        .filter(|e| e.cluster().unwrap_or(UNCATEGORIZED) == label)
        .collect();
    members.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    members.truncate(limit);
    members
}

/// Written digest of a corpus for the insights dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusDigest {
    pub summary: String,
    pub actionable_insights: Vec<String>,
}

/// Share of negative reviews (percent) above which follow-up is suggested.
const NEGATIVE_ALERT_PERCENT: f64 = 30.0;

fn cluster_hint(label: ClusterLabel) -> Option<&'static str> {
    match label {
        ClusterLabel::TasteIssues => Some("Revisit recipes and food quality raised in taste complaints"),
        ClusterLabel::ServiceIssues => Some("Review staffing levels and service speed"),
        ClusterLabel::AmbienceProblems => Some("Look into seating, noise and decor complaints"),
        ClusterLabel::HygieneProblems => Some("Audit cleanliness and hygiene practices"),
        ClusterLabel::DeliveryDelay => Some("Investigate delivery times and packaging"),
        ClusterLabel::StronglyNegative => Some("Reach out to guests who reported very poor experiences"),
        _ => None,
    }
}

/// Compose a rule-based digest from already computed dashboard figures.
pub fn digest_corpus(
    metrics: &CorpusMetrics,
    top_clusters: &[String],
    top_keywords: &[KeywordCount],
) -> CorpusDigest {
    if metrics.total == 0 {
        return CorpusDigest {
            summary: "No reviews have been analyzed yet.".to_string(),
            actionable_insights: vec!["Upload reviews to start tracking sentiment".to_string()],
        };
    }

    let mut summary = format!(
        "{} reviews analyzed: {} positive, {} negative and {} neutral ({:.2}% positive). Average rating {:.2} out of 5.",
        metrics.total,
        metrics.positive,
        metrics.negative,
        metrics.neutral,
        metrics.positive_ratio,
        metrics.avg_rating,
    );
    if !top_clusters.is_empty() {
        summary.push_str(&format!(" Most common themes: {}.", top_clusters.join(", ")));
    }
    if !top_keywords.is_empty() {
        let words: Vec<&str> = top_keywords.iter().take(5).map(|k| k.keyword.as_str()).collect();
        summary.push_str(&format!(" Frequent keywords: {}.", words.join(", ")));
    }

    let mut insights: Vec<String> = top_clusters
        .iter()
        .filter_map(|label| ClusterLabel::from_label(label))
        .filter_map(cluster_hint)
        .map(str::to_string)
        .collect();

    let negative_percent = metrics.negative as f64 / metrics.total as f64 * 100.0;
    if negative_percent > NEGATIVE_ALERT_PERCENT {
        insights.push(format!(
            "{negative_percent:.0}% of reviews are negative; follow up with unhappy customers"
        ));
    }
    if metrics.fake_count > 0 {
        insights.push(format!("Investigate {} reviews flagged as fake", metrics.fake_count));
    }
    if metrics.avg_rating >= 4.0 {
        insights.push("Highlight top-rated themes in marketing".to_string());
    }
    if insights.is_empty() {
        insights.push("Keep monitoring review clusters and keyword trends".to_string());
    }

    CorpusDigest {
        summary,
        actionable_insights: insights,
    }
}
