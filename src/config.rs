//! Environment-driven service configuration.

use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::error::ExternalServiceError;
use crate::gemini::{GeminiClient, DEFAULT_BASE_URL, DEFAULT_MODEL};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_BULK_CONCURRENCY: usize = 4;
pub const DEFAULT_LOG_FILTER: &str = "review_insights=info,tower_http=info";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub analysis_timeout: Duration,
    pub bulk_concurrency: usize,
}

impl AppConfig {
    /// Read configuration from the process environment (after `.env`).
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from any variable source. Missing or
    /// unparseable values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_addr = parse_or(&lookup, "BIND_ADDR", || {
            SocketAddr::from(([0, 0, 0, 0], 3000))
        });
        let timeout_secs: u64 = parse_or(&lookup, "ANALYSIS_TIMEOUT_SECS", || DEFAULT_TIMEOUT_SECS);
        let bulk_concurrency: usize =
            parse_or(&lookup, "BULK_CONCURRENCY", || DEFAULT_BULK_CONCURRENCY);

        Self {
            bind_addr,
            gemini_api_key: non_empty("GEMINI_API_KEY"),
            gemini_model: non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: non_empty("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            analysis_timeout: Duration::from_secs(timeout_secs.max(1)),
            bulk_concurrency: bulk_concurrency.max(1),
        }
    }

    /// Construct the Gemini client when an API key is configured.
    pub fn gemini_client(&self) -> Result<GeminiClient, ExternalServiceError> {
        let key = self
            .gemini_api_key
            .as_deref()
            .ok_or(ExternalServiceError::NotConfigured)?;
        GeminiClient::new(
            key,
            self.gemini_model.as_str(),
            self.gemini_base_url.as_str(),
            self.analysis_timeout,
        )
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_or<T, F>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: F) -> T
where
    T: FromStr,
    T::Err: Display,
    F: FnOnce() -> T,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => match raw.trim().parse() {
            Ok(value) => value,
            Err(err) => {
                warn!(variable = name, value = %raw, error = %err, "invalid value, using default");
                default()
            }
        },
        _ => default(),
    }
}
