//! Gemini `generateContent` client implementing [`ExternalAnalyzer`].

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::ExternalServiceError;
use crate::external::{parse_external_payload, ExternalAnalysis, ExternalAnalyzer};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Build the analysis prompt sent to the model.
pub fn analysis_prompt(clean_text: &str) -> String {
    format!(
        r#"Clean and analyze this restaurant review. Remove formatting symbols, RTF, or junk text. Extract meaning only.

Review text: "{clean_text}"

Analyze the review and return STRICT JSON only (no markdown, no code blocks):
{{
  "cleanText": "cleaned version of the review text",
  "sentiment": {{
    "taste": "very_positive" | "positive" | "neutral" | "negative" | "very_negative",
    "service": "very_positive" | "positive" | "neutral" | "negative" | "very_negative",
    "ambience": "very_positive" | "positive" | "neutral" | "negative" | "very_negative",
    "hygiene": "very_positive" | "positive" | "neutral" | "negative" | "very_negative",
    "delivery": "very_positive" | "positive" | "neutral" | "negative" | "very_negative",
    "overall": "very_positive" | "positive" | "neutral" | "negative" | "very_negative"
  }},
  "keywords": ["keyword1", "keyword2", "keyword3", "keyword4", "keyword5"],
  "clusterLabel": "specific cluster name",
  "isFakeReview": boolean,
  "language": "language code"
}}

SENTIMENT RULES:
- "very_positive" for extremely positive reviews (amazing, excellent, perfect, best ever)
- "positive" for good reviews (good, great, nice, enjoyed)
- "neutral" only when truly neutral (okay, average, nothing special)
- "negative" for bad reviews (bad, poor, disappointed)
- "very_negative" for extremely bad reviews (terrible, worst, horrible, disgusting)

CLUSTER LABELS (choose the most specific one):
Taste Praise, Taste Issues, Service Praise, Service Issues, Ambience Praise,
Ambience Problems, Hygiene Problems, Delivery Praise, Delivery Delay,
Mixed Feedback, Strongly Positive Experience, Strongly Negative Experience,
General Feedback (only when nothing else applies).

KEYWORDS: 5-10 meaningful keywords (no stopwords, no formatting junk).

Return ONLY valid JSON, nothing else."#
    )
}

/// Client for the Gemini REST API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ExternalServiceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    async fn generate(&self, prompt: &str) -> Result<String, ExternalServiceError> {
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExternalServiceError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ExternalServiceError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl ExternalAnalyzer for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn analyze_externally(&self, clean_text: &str) -> Result<ExternalAnalysis, ExternalServiceError> {
        let text = self.generate(&analysis_prompt(clean_text)).await?;
        debug!(model = %self.model, chars = text.len(), "gemini responded");
        parse_external_payload(&text)
    }
}
