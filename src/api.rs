//! HTTP surface of the review service.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::{IntoParams, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::aggregate::{
    aggregate_clusters, aggregate_keywords, cluster_members, corpus_metrics, daily_trend,
    digest_corpus, sentiment_trend, top_clusters, ClusterSummary, CorpusMetrics, KeywordCount,
    SentimentBreakdown,
    TrendPeriod, TrendPoint, CLUSTER_MEMBER_LIMIT,
};
use crate::analyzer::{AnalysisResult, ReviewAnalyzer};
use crate::cluster::ClusterLabel;
use crate::sentiment::{Sentiment, SentimentVector};
use crate::store::{Pagination, ReviewQuery, ReviewSort, ReviewStore, StoredReview};
use crate::worker::{check_review_length, ingest_reviews, split_reviews, IngestFailure, IngestReport};

pub const DEFAULT_TAG_LIMIT: usize = 50;
pub const INSIGHT_KEYWORDS: usize = 10;
pub const INSIGHT_TREND_DAYS: u32 = 30;
pub const INSIGHT_TOP_CLUSTERS: usize = 5;

pub struct AppState {
    pub analyzer: ReviewAnalyzer,
    pub store: ReviewStore,
    pub bulk_concurrency: usize,
}

impl AppState {
    pub fn new(analyzer: ReviewAnalyzer, bulk_concurrency: usize) -> Self {
        Self {
            analyzer,
            store: ReviewStore::new(),
            bulk_concurrency: bulk_concurrency.max(1),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: error.into(),
        }),
    )
}

fn bad_json(rejection: JsonRejection) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, rejection.body_text())
}

fn bad_query(rejection: QueryRejection) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, rejection.body_text())
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub external_analyzer: bool,
    pub reviews: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    #[schema(example = "The food was excellent, service was terrible and slow.")]
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub success: bool,
    pub data: StoredReview,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewListResponse {
    pub success: bool,
    pub data: Vec<StoredReview>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkResponse {
    pub success: bool,
    pub data: IngestReport,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClustersResponse {
    pub success: bool,
    pub data: Vec<ClusterSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClusterMembersResponse {
    pub success: bool,
    pub label: String,
    pub data: Vec<StoredReview>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TagsResponse {
    pub success: bool,
    pub data: Vec<KeywordCount>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrendsResponse {
    pub success: bool,
    pub period: TrendPeriod,
    pub data: Vec<TrendPoint>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub metrics: CorpusMetrics,
    pub top_keywords: Vec<KeywordCount>,
    pub trend_data: Vec<TrendPoint>,
    pub top_clusters: Vec<String>,
    pub summary: String,
    pub actionable_insights: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InsightsResponse {
    pub success: bool,
    pub data: Insights,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// 1-based page number.
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub cluster: Option<String>,
    #[serde(rename = "isFake")]
    pub is_fake: Option<bool>,
    /// `-createdAt` (default), `createdAt`, `-rating` or `rating`.
    pub sort: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TagParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TrendParams {
    /// `weekly` or `monthly` (default).
    pub period: Option<TrendPeriod>,
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "system"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        external_analyzer: state.analyzer.has_external(),
        reviews: state.store.len(),
    })
}

#[utoipa::path(
    post,
    path = "/reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review analyzed and stored", body = ReviewResponse),
        (status = 400, description = "Invalid review text", body = ErrorResponse),
        (status = 500, description = "Review could not be stored", body = ErrorResponse)
    ),
    tag = "reviews"
)]
pub async fn create_review(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateReviewRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ReviewResponse>), ApiError> {
    let Json(req) = payload.map_err(bad_json)?;
    let text = req.text.trim();
    check_review_length(text).map_err(|msg| api_error(StatusCode::BAD_REQUEST, msg))?;

    let analysis = state
        .analyzer
        .analyze(text)
        .await
        .map_err(|err| api_error(StatusCode::BAD_REQUEST, err.to_string()))?;

    let review = state
        .store
        .insert(StoredReview::new(text, analysis))
        .ok_or_else(|| api_error(StatusCode::INTERNAL_SERVER_ERROR, "Review could not be stored"))?;
    info!(review_id = %review.id, cluster = %review.analysis.cluster, rating = review.analysis.rating, "review stored");

    Ok((
        StatusCode::CREATED,
        Json(ReviewResponse {
            success: true,
            data: review,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/reviews/bulk",
    request_body(content = String, content_type = "text/plain", description = "One review per line"),
    responses(
        (status = 200, description = "Ingestion report", body = BulkResponse),
        (status = 400, description = "No usable lines", body = ErrorResponse)
    ),
    tag = "reviews"
)]
pub async fn bulk_reviews(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<BulkResponse>, ApiError> {
    let texts = split_reviews(&body);
    if texts.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "No valid reviews found (one per line, longer than 10 characters)",
        ));
    }

    let report = ingest_reviews(&state.analyzer, &state.store, texts, state.bulk_concurrency).await;
    Ok(Json(BulkResponse {
        success: true,
        data: report,
    }))
}

#[utoipa::path(
    get,
    path = "/reviews/all",
    params(ListParams),
    responses(
        (status = 200, description = "Page of reviews", body = ReviewListResponse),
        (status = 400, description = "Unknown sort key or malformed query", body = ErrorResponse)
    ),
    tag = "reviews"
)]
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ReviewListResponse>, ApiError> {
    let Query(params) = params.map_err(bad_query)?;
    let sort = match params.sort.as_deref() {
        None => ReviewSort::default(),
        Some(raw) => ReviewSort::parse(raw).ok_or_else(|| {
            api_error(StatusCode::BAD_REQUEST, format!("Unknown sort key: {raw}"))
        })?,
    };

    let page = state.store.list(&ReviewQuery {
        page: params.page.unwrap_or(1),
        limit: params.limit.unwrap_or(0),
        cluster: params.cluster,
        is_fake: params.is_fake,
        sort,
    });

    Ok(Json(ReviewListResponse {
        success: true,
        data: page.reviews,
        pagination: page.pagination,
    }))
}

#[utoipa::path(
    get,
    path = "/reviews/clusters",
    responses((status = 200, description = "Cluster summaries", body = ClustersResponse)),
    tag = "analytics"
)]
pub async fn get_clusters(State(state): State<Arc<AppState>>) -> Json<ClustersResponse> {
    Json(ClustersResponse {
        success: true,
        data: aggregate_clusters(&state.store.snapshot()),
    })
}

#[utoipa::path(
    get,
    path = "/reviews/clusters/{label}",
    params(("label" = String, Path, description = "Cluster label, e.g. `Taste Praise`")),
    responses((status = 200, description = "Newest members of the cluster", body = ClusterMembersResponse)),
    tag = "analytics"
)]
pub async fn get_cluster_members(
    State(state): State<Arc<AppState>>,
    Path(label): Path<String>,
) -> Json<ClusterMembersResponse> {
    let snapshot = state.store.snapshot();
    let data = cluster_members(&snapshot, &label, CLUSTER_MEMBER_LIMIT)
        .into_iter()
        .cloned()
        .collect();

    Json(ClusterMembersResponse {
        success: true,
        label,
        data,
    })
}

#[utoipa::path(
    get,
    path = "/reviews/tags",
    params(TagParams),
    responses(
        (status = 200, description = "Keyword frequencies", body = TagsResponse),
        (status = 400, description = "Malformed query", body = ErrorResponse)
    ),
    tag = "analytics"
)]
pub async fn get_tags(
    State(state): State<Arc<AppState>>,
    params: Result<Query<TagParams>, QueryRejection>,
) -> Result<Json<TagsResponse>, ApiError> {
    let Query(params) = params.map_err(bad_query)?;
    let limit = params.limit.unwrap_or(DEFAULT_TAG_LIMIT);
    Ok(Json(TagsResponse {
        success: true,
        data: aggregate_keywords(&state.store.snapshot(), limit),
    }))
}

#[utoipa::path(
    get,
    path = "/reviews/trends",
    params(TrendParams),
    responses(
        (status = 200, description = "Sentiment trend", body = TrendsResponse),
        (status = 400, description = "Unknown period", body = ErrorResponse)
    ),
    tag = "analytics"
)]
pub async fn get_trends(
    State(state): State<Arc<AppState>>,
    params: Result<Query<TrendParams>, QueryRejection>,
) -> Result<Json<TrendsResponse>, ApiError> {
    let Query(params) = params.map_err(bad_query)?;
    let period = params.period.unwrap_or_default();
    Ok(Json(TrendsResponse {
        success: true,
        period,
        data: sentiment_trend(&state.store.snapshot(), period, Utc::now()),
    }))
}

#[utoipa::path(
    get,
    path = "/reviews/insights",
    responses((status = 200, description = "Dashboard metrics", body = InsightsResponse)),
    tag = "analytics"
)]
pub async fn get_insights(State(state): State<Arc<AppState>>) -> Json<InsightsResponse> {
    let snapshot = state.store.snapshot();
    let metrics = corpus_metrics(&snapshot);
    let top_keywords = aggregate_keywords(&snapshot, INSIGHT_KEYWORDS);
    let top_clusters = top_clusters(&snapshot, INSIGHT_TOP_CLUSTERS);
    let digest = digest_corpus(&metrics, &top_clusters, &top_keywords);

    Json(InsightsResponse {
        success: true,
        data: Insights {
            metrics,
            top_keywords,
            trend_data: daily_trend(&snapshot, INSIGHT_TREND_DAYS, Utc::now()),
            top_clusters,
            summary: digest.summary,
            actionable_insights: digest.actionable_insights,
        },
    })
}

#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    params(("id" = String, Path, description = "Review id")),
    responses(
        (status = 200, description = "Review deleted", body = MessageResponse),
        (status = 404, description = "Review not found", body = ErrorResponse)
    ),
    tag = "reviews"
)]
pub async fn delete_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.store.delete(&id) {
        return Err(api_error(StatusCode::NOT_FOUND, "Review not found"));
    }

    Ok(Json(MessageResponse {
        success: true,
        message: "Review deleted successfully".to_string(),
    }))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        create_review,
        bulk_reviews,
        list_reviews,
        get_clusters,
        get_cluster_members,
        get_tags,
        get_trends,
        get_insights,
        delete_review
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            CreateReviewRequest,
            ReviewResponse,
            ReviewListResponse,
            BulkResponse,
            ClustersResponse,
            ClusterMembersResponse,
            TagsResponse,
            TrendsResponse,
            Insights,
            InsightsResponse,
            MessageResponse,
            StoredReview,
            Pagination,
            AnalysisResult,
            SentimentVector,
            Sentiment,
            ClusterLabel,
            ClusterSummary,
            SentimentBreakdown,
            KeywordCount,
            CorpusMetrics,
            TrendPoint,
            TrendPeriod,
            IngestReport,
            IngestFailure
        )
    ),
    tags(
        (name = "reviews", description = "Review ingestion and listing"),
        (name = "analytics", description = "Corpus dashboards"),
        (name = "system", description = "Service health")
    )
)]
pub struct ApiDoc;

/// Build the service router with Swagger UI mounted at `/swagger-ui`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health))
        .route("/reviews", post(create_review))
        .route("/reviews/bulk", post(bulk_reviews))
        .route("/reviews/all", get(list_reviews))
        .route("/reviews/clusters", get(get_clusters))
        .route("/reviews/clusters/:label", get(get_cluster_members))
        .route("/reviews/tags", get(get_tags))
        .route("/reviews/trends", get(get_trends))
        .route("/reviews/insights", get(get_insights))
        .route("/reviews/:id", delete(delete_review))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
