use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::analyze::{AnalysisOutcome, Analyzer};
use crate::store::StoredResult;

const DEFAULT_RESULTS_LIMIT: usize = 20;
const MAX_RESULTS_LIMIT: usize = 500;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
}

pub fn router(analyzer: Arc<Analyzer>) -> Router {
    let state = AppState { analyzer };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/analyze", post(analyze))
        .route("/analyze/batch", post(analyze_batch))
        .route("/results", get(recent_results))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct AnalyzeReq {
    // any JSON value; non-strings come back as a structured error
    #[serde(default)]
    comment: Value,
}

#[derive(serde::Deserialize)]
struct BatchReq {
    #[serde(default)]
    comments: Value,
}

#[derive(serde::Deserialize)]
struct ResultsQuery {
    limit: Option<usize>,
}

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeReq>,
) -> (StatusCode, Json<AnalysisOutcome>) {
    let outcome = state.analyzer.analyze_value(&body.comment).await;
    let status = if outcome.is_error() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    (status, Json(outcome))
}

async fn analyze_batch(
    State(state): State<AppState>,
    Json(body): Json<BatchReq>,
) -> Response {
    let Value::Array(items) = body.comments else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "`comments` must be an array" })),
        )
            .into_response();
    };
    let outcomes = state.analyzer.analyze_batch(&items).await;
    Json(outcomes).into_response()
}

async fn recent_results(
    State(state): State<AppState>,
    Query(q): Query<ResultsQuery>,
) -> Json<Vec<StoredResult>> {
    let limit = q
        .limit
        .unwrap_or(DEFAULT_RESULTS_LIMIT)
        .min(MAX_RESULTS_LIMIT);
    Json(state.analyzer.store().load_recent(limit))
}
