use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use dotenv::dotenv;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use review_insights::aggregate::{aggregate_clusters, aggregate_keywords};
use review_insights::config::{AppConfig, DEFAULT_LOG_FILTER};
use review_insights::{AnalysisResult, ReviewAnalyzer};

/// Analyze restaurant reviews from the command line.
#[derive(Parser, Debug)]
#[command(name = "review-analyze", version, about)]
struct Cli {
    /// Review text to analyze
    #[arg(short, long, conflicts_with = "file")]
    text: Option<String>,

    /// File with one review per line
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Also print cluster summaries and top keywords
    #[arg(long)]
    summary: bool,

    /// Skip the external analyzer even when GEMINI_API_KEY is set
    #[arg(long)]
    offline: bool,

    /// Reviews analyzed concurrently
    #[arg(long, env = "BULK_CONCURRENCY", default_value = "4")]
    concurrency: usize,

    /// Keywords shown in the summary
    #[arg(long, default_value = "10")]
    top_keywords: usize,
}

/// Non-blank lines of `content`, trimmed, with their 1-based line numbers.
fn numbered_lines(content: &str) -> Vec<(usize, String)> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(number, line)| (number, line.to_string()))
        .collect()
}

fn read_reviews(cli: &Cli) -> Result<Vec<(usize, String)>> {
    if let Some(text) = &cli.text {
        return Ok(vec![(1, text.clone())]);
    }
    let Some(path) = &cli.file else {
        bail!("pass --text or --file");
    };

    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(numbered_lines(&content))
}

fn build_analyzer(offline: bool) -> ReviewAnalyzer {
    if offline {
        return ReviewAnalyzer::local();
    }
    let config = AppConfig::from_env();
    match config.gemini_client() {
        Ok(client) => ReviewAnalyzer::with_external(Arc::new(client), config.analysis_timeout),
        Err(_) => ReviewAnalyzer::local(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();
    let reviews = read_reviews(&cli)?;
    let analyzer = build_analyzer(cli.offline);

    let (lines, texts): (Vec<usize>, Vec<String>) = reviews.into_iter().unzip();
    let results = analyzer.analyze_batch(texts, cli.concurrency).await;

    let mut analyzed: Vec<AnalysisResult> = Vec::new();
    for (line, result) in lines.into_iter().zip(results) {
        match result {
            Ok(analysis) => {
                println!("{}", serde_json::to_string(&analysis)?);
                analyzed.push(analysis);
            }
            Err(err) => warn!(line, error = %err, "skipped review"),
        }
    }

    if cli.summary {
        let summary = serde_json::json!({
            "clusters": aggregate_clusters(&analyzed),
            "topKeywords": aggregate_keywords(&analyzed, cli.top_keywords),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    if analyzed.is_empty() {
        bail!("no review could be analyzed");
    }
    Ok(())
}
