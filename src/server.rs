use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::bulk::{score_upload, BulkError, BulkReport};
use crate::client::{validate_record, ClientOverrides, ClientRecord, ValidationIssue};
use crate::config::Config;
use crate::hanoi::scoreboard::{leaderboard, summarize_scores, RankedScore};
use crate::hanoi::state::DEFAULT_SCOREBOARD_DISKS;
use crate::hanoi::{generate_moves, minimum_moves};
use crate::optimizer::minimal::find_minimal_change;
use crate::optimizer::recommendations::{recommend, RecommendationReport};
use crate::optimizer::sensitivity::sensitivity_analysis;
use crate::optimizer::{MinimalChange, SearchError, SensitivityPoint};
use crate::scoring::{Prediction, Scorer, ScoringError};
use crate::storage::{HistoryStore, MoveHistoryEntry, RecordedMove, ScoreStore};
use crate::strategy::{guide, StrategyGuide};

#[derive(Clone)]
struct ApiState {
    config: Config,
    scorer: Arc<dyn Scorer>,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(error: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
        }
    }
}

impl From<ScoringError> for ApiError {
    fn from(err: ScoringError) -> Self {
        match err {
            ScoringError::InvalidInput(_) => Self::bad_request(err.to_string()),
            _ => Self::internal(err),
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::EmptyOptions(_) => Self::bad_request(err.to_string()),
            SearchError::Scoring { .. } => Self::internal(err),
        }
    }
}

impl From<BulkError> for ApiError {
    fn from(err: BulkError) -> Self {
        match err {
            BulkError::Parse(_) | BulkError::MissingColumns(_) => {
                Self::bad_request(err.to_string())
            }
            BulkError::Scoring(_) => Self::internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    model: String,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct PredictResponse {
    record: ClientRecord,
    prediction: Prediction,
}

#[derive(Debug, Serialize)]
struct BulkResponse {
    total: usize,
    prioritized: usize,
    report: BulkReport,
}

#[derive(Debug, Deserialize)]
struct SolveRequest {
    disks: u32,
}

#[derive(Debug, Serialize)]
struct SolveResponse {
    disks: u32,
    minimum_moves: u64,
    moves: Vec<RecordedMove>,
}

#[derive(Debug, Default, Deserialize)]
struct ScoresQuery {
    disks: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ScoresResponse {
    disks: u32,
    summary: String,
    leaderboard: Vec<RankedScore>,
}

#[derive(Debug, Default, Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
    total: usize,
    entries: Vec<MoveHistoryEntry>,
}

pub async fn run_server(config: Config, scorer: Arc<dyn Scorer>, bind: SocketAddr) -> Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(ApiState { config, scorer }).layer(cors);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("REST API listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/config", get(show_config))
        .route("/v1/strategy", get(strategy))
        .route("/v1/predict", post(predict))
        .route("/v1/recommend", post(recommend_handler))
        .route("/v1/minimal-change", post(minimal_change))
        .route("/v1/sensitivity", post(sensitivity))
        .route("/v1/bulk", post(bulk))
        .route("/v1/hanoi/solve", post(hanoi_solve))
        .route("/v1/hanoi/scores", get(hanoi_scores))
        .route("/v1/hanoi/history", get(hanoi_history))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse {
        status: "ok",
        model: state.scorer.name().to_string(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn show_config(State(state): State<ApiState>) -> Json<ApiResponse<Config>> {
    ok(state.config)
}

async fn strategy() -> Json<ApiResponse<StrategyGuide>> {
    ok(guide())
}

async fn predict(
    State(state): State<ApiState>,
    Json(overrides): Json<ClientOverrides>,
) -> ApiResult<PredictResponse> {
    let record = validated_record(overrides)?;
    let probabilities = state.scorer.predict_proba(&record).await?;
    info!(
        subscribe = probabilities.subscribe,
        model = state.scorer.name(),
        "prediction served"
    );
    Ok(ok(PredictResponse {
        record,
        prediction: Prediction::from(probabilities),
    }))
}

async fn recommend_handler(
    State(state): State<ApiState>,
    Json(overrides): Json<ClientOverrides>,
) -> ApiResult<RecommendationReport> {
    let record = validated_record(overrides)?;
    let report = recommend(
        state.scorer.as_ref(),
        &record,
        &state.config.search.space(),
        state.config.search.on_scoring_error,
    )
    .await?;
    if report.outcome.failed > 0 {
        warn!(
            failed = report.outcome.failed,
            evaluated = report.outcome.evaluated,
            "candidates skipped after scoring errors"
        );
    }
    Ok(ok(report))
}

async fn minimal_change(
    State(state): State<ApiState>,
    Json(overrides): Json<ClientOverrides>,
) -> ApiResult<MinimalChange> {
    let record = validated_record(overrides)?;
    let result = find_minimal_change(
        state.scorer.as_ref(),
        &record,
        state.config.prediction.success_threshold,
    )
    .await?;
    Ok(ok(result))
}

async fn sensitivity(
    State(state): State<ApiState>,
    Json(overrides): Json<ClientOverrides>,
) -> ApiResult<Vec<SensitivityPoint>> {
    let record = validated_record(overrides)?;
    let points = sensitivity_analysis(state.scorer.as_ref(), &record).await?;
    Ok(ok(points))
}

async fn bulk(State(state): State<ApiState>, body: String) -> ApiResult<BulkResponse> {
    let report = score_upload(
        state.scorer.as_ref(),
        &body,
        state.config.prediction.success_threshold,
    )
    .await
    .map_err(|err| {
        warn!(error = %err, "bulk upload rejected");
        ApiError::from(err)
    })?;
    info!(rows = report.rows.len(), "bulk upload scored");
    Ok(ok(BulkResponse {
        total: report.rows.len(),
        prioritized: report.prioritized(),
        report,
    }))
}

async fn hanoi_solve(
    State(state): State<ApiState>,
    Json(request): Json<SolveRequest>,
) -> ApiResult<SolveResponse> {
    let disks = state.config.hanoi.clamp_disks(request.disks);
    let moves = generate_moves(disks, 0, 2, 1)
        .into_iter()
        .map(RecordedMove::from)
        .collect();
    Ok(ok(SolveResponse {
        disks,
        minimum_moves: minimum_moves(disks),
        moves,
    }))
}

async fn hanoi_scores(
    State(state): State<ApiState>,
    Query(query): Query<ScoresQuery>,
) -> ApiResult<ScoresResponse> {
    let disks = state
        .config
        .hanoi
        .clamp_disks(query.disks.unwrap_or(DEFAULT_SCOREBOARD_DISKS));
    let store = ScoreStore::open(&state.config.storage.resolved_scoreboard_path());
    Ok(ok(ScoresResponse {
        disks,
        summary: summarize_scores(store.entries(), Some(disks)),
        leaderboard: leaderboard(store.entries(), disks),
    }))
}

async fn hanoi_history(
    State(state): State<ApiState>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<HistoryResponse> {
    let store = HistoryStore::open(&state.config.storage.resolved_history_path());
    let entries = store.entries();
    let limit = query.limit.unwrap_or(entries.len());
    let start = entries.len().saturating_sub(limit);
    Ok(ok(HistoryResponse {
        total: entries.len(),
        entries: entries[start..].to_vec(),
    }))
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { ok: true, data })
}

fn validated_record(overrides: ClientOverrides) -> std::result::Result<ClientRecord, ApiError> {
    let record = overrides.into_record();
    let issues = validate_record(&record);
    if issues.is_empty() {
        Ok(record)
    } else {
        Err(ApiError::bad_request(join_issues(&issues)))
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ValidationIssue::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
