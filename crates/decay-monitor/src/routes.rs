//! HTTP read API.
//!
//! `GET /api/analyze[?ticker=X]` scores one ticker or the whole watchlist,
//! `GET /api/cron` runs the daily cycle immediately.

use axum::{
    extract::{Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use decay_core::Tier;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::analyzer::TickerAnalysis;
use crate::config::normalize_ticker;
use crate::cycle::{run_daily_cycle, CycleReport};
use crate::AppState;

#[derive(Deserialize)]
pub struct AnalyzeQuery {
    pub ticker: Option<String>,
}

#[derive(Serialize)]
pub struct WatchlistReport {
    pub timestamp: DateTime<Utc>,
    pub total: usize,
    pub critical: usize,
    pub warning: usize,
    pub results: Vec<TickerAnalysis>,
}

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route("/api/analyze", get(analyze))
        .route("/api/cron", get(cron))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn analyze(
    State(state): State<AppState>,
    Query(query): Query<AnalyzeQuery>,
) -> Result<Response, AppError> {
    match query.ticker.filter(|t| !t.trim().is_empty()) {
        Some(raw) => {
            let ticker = normalize_ticker(&raw)
                .ok_or_else(|| AppError::BadRequest(format!("Invalid ticker '{}'", raw)))?;
            let analysis = state.analyzer.analyze_ticker(&ticker).await;
            Ok(Json(analysis).into_response())
        }
        None => {
            let mut results = state
                .analyzer
                .analyze_watchlist(&state.config.watchlist, state.config.analyze_delay)
                .await;
            results.sort_by(|a, b| b.score.cmp(&a.score));

            let count = |tier: Tier| results.iter().filter(|r| r.tier == tier).count();
            let report = WatchlistReport {
                timestamp: Utc::now(),
                total: results.len(),
                critical: count(Tier::Critical),
                warning: count(Tier::Warning),
                results,
            };
            Ok(Json(report).into_response())
        }
    }
}

async fn cron(State(state): State<AppState>) -> Json<CycleReport> {
    let report = run_daily_cycle(
        &state.analyzer,
        &state.coordinator,
        &state.notifier,
        &state.config.watchlist,
        state.config.cron_delay,
    )
    .await;
    Json(report)
}
