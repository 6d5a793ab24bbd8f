use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use review_insights::api::{self, AppState};
use review_insights::config::{AppConfig, DEFAULT_LOG_FILTER};
use review_insights::error::ExternalServiceError;
use review_insights::ReviewAnalyzer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = AppConfig::from_env();

    let analyzer = match config.gemini_client() {
        Ok(client) => {
            info!(model = %config.gemini_model, "external analysis enabled");
            ReviewAnalyzer::with_external(Arc::new(client), config.analysis_timeout)
        }
        Err(ExternalServiceError::NotConfigured) => {
            info!("GEMINI_API_KEY not set, using heuristic analysis only");
            ReviewAnalyzer::local()
        }
        Err(err) => {
            warn!(error = %err, "could not build gemini client, using heuristic analysis only");
            ReviewAnalyzer::local()
        }
    };

    let state = Arc::new(AppState::new(analyzer, config.bulk_concurrency));
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
