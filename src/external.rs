//! Optional external analysis collaborator.
//!
//! An [`ExternalAnalyzer`] returns loosely structured output that must not be
//! trusted: every field is optional and read leniently here, then validated
//! and normalized by the orchestrator before it becomes an `AnalysisResult`.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::ExternalServiceError;
use crate::sentiment::{Sentiment, SentimentVector};

/// Capability injected into the orchestrator when an external service is configured.
#[async_trait]
pub trait ExternalAnalyzer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn analyze_externally(&self, clean_text: &str) -> Result<ExternalAnalysis, ExternalServiceError>;
}

/// Sentiment block of an external response, one raw label per field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalSentiment {
    pub taste: Option<String>,
    pub service: Option<String>,
    pub ambience: Option<String>,
    pub hygiene: Option<String>,
    pub delivery: Option<String>,
    pub overall: Option<String>,
}

impl ExternalSentiment {
    /// Normalize every field onto the fixed scale, defaulting to neutral.
    pub fn normalize(&self) -> SentimentVector {
        let field = |raw: &Option<String>| raw.as_deref().map(Sentiment::normalize).unwrap_or_default();
        SentimentVector {
            taste: field(&self.taste),
            service: field(&self.service),
            ambience: field(&self.ambience),
            hygiene: field(&self.hygiene),
            delivery: field(&self.delivery),
            overall: field(&self.overall),
        }
    }
}

/// Raw, unvalidated analysis supplied by an external collaborator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalAnalysis {
    pub clean_text: Option<String>,
    pub sentiment: ExternalSentiment,
    /// String entries only; other JSON values are dropped while reading.
    pub keywords: Vec<String>,
    pub cluster_label: Option<String>,
    pub is_fake_review: Option<bool>,
    pub language: Option<String>,
}

impl ExternalAnalysis {
    /// Read the known fields of a JSON object, ignoring wrong-typed values.
    pub fn from_value(value: &Value) -> Result<Self, ExternalServiceError> {
        let object = value
            .as_object()
            .ok_or_else(|| ExternalServiceError::Malformed("payload is not a JSON object".to_string()))?;

        let string = |v: Option<&Value>| v.and_then(Value::as_str).map(str::to_string);
        let sentiment = object.get("sentiment");
        let sentiment_field = |name: &str| string(sentiment.and_then(|s| s.get(name)));

        Ok(Self {
            clean_text: string(object.get("cleanText")),
            sentiment: ExternalSentiment {
                taste: sentiment_field("taste"),
                service: sentiment_field("service"),
                ambience: sentiment_field("ambience"),
                hygiene: sentiment_field("hygiene"),
                delivery: sentiment_field("delivery"),
                overall: sentiment_field("overall"),
            },
            keywords: object
                .get("keywords")
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
                .unwrap_or_default(),
            cluster_label: string(object.get("clusterLabel")),
            is_fake_review: object.get("isFakeReview").and_then(Value::as_bool),
            language: string(object.get("language")),
        })
    }
}

static FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```(?:json|JSON)?[ \t]*\r?\n?").unwrap());

/// Parse the text body produced by a generative model into an [`ExternalAnalysis`].
///
/// Tolerates markdown code fences and prose around the JSON object.
pub fn parse_external_payload(text: &str) -> Result<ExternalAnalysis, ExternalServiceError> {
    let unfenced = FENCE.replace_all(text.trim(), "");
    let unfenced = unfenced.trim();

    let json = match (unfenced.find('{'), unfenced.rfind('}')) {
        (Some(start), Some(end)) if start < end => &unfenced[start..=end],
        _ => {
            return Err(ExternalServiceError::Malformed(
                "no JSON object in response".to_string(),
            ))
        }
    };

    let value: Value = serde_json::from_str(json)?;
    ExternalAnalysis::from_value(&value)
}
