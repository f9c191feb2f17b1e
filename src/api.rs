//! REST API server for the FinCoach engine
//!
//! Exposes the engine's contracts as JSON endpoints for the coaching client.
//! The caller's `Authorization` header is parsed into a [`Credential`] and
//! forwarded explicitly to the remote collaborators.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::credential::Credential;
use crate::engine::FinCoachEngine;
use crate::models::{FinancialSnapshot, HealthBand, ScoreBreakdown};
use crate::simulator::MAX_HORIZON_MONTHS;

const DEFAULT_HORIZON_MONTHS: u32 = 3;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub snapshot: FinancialSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct SimulateRequest {
    #[serde(default)]
    pub snapshot: FinancialSnapshot,
    pub amount: f64,
    #[serde(default = "default_months")]
    pub months: u32,
    #[serde(default)]
    pub advise: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReasonRequest {
    #[serde(default)]
    pub snapshot: FinancialSnapshot,
    pub query: String,
}

fn default_months() -> u32 {
    DEFAULT_HORIZON_MONTHS
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    pub score: u8,
    pub band: HealthBand,
    pub breakdown: ScoreBreakdown,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<FinCoachEngine>,
}

fn credential_from(headers: &HeaderMap) -> Credential {
    Credential::from_authorization_header(headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()))
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Engine Endpoints
/// =============================

async fn score_handler(
    State(state): State<ApiState>,
    Json(req): Json<ScoreRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let (score, band, breakdown) = state.engine.score_report(&req.snapshot);

    (
        StatusCode::OK,
        Json(ApiResponse::success(ScoreResponse {
            score,
            band,
            breakdown,
        })),
    )
}

async fn simulate_handler(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(req): Json<SimulateRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    if !req.amount.is_finite() || req.amount < 0.0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("amount must be a non-negative number".into())),
        );
    }
    if req.months == 0 || req.months > MAX_HORIZON_MONTHS {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format!(
                "months must be between 1 and {}",
                MAX_HORIZON_MONTHS
            ))),
        );
    }

    let result = if req.advise {
        let credential = credential_from(&headers);
        state
            .engine
            .simulate_with_advisory(&req.snapshot, req.amount, req.months, &credential)
            .resolve()
            .await
    } else {
        state.engine.simulate(&req.snapshot, req.amount, req.months)
    };

    (StatusCode::OK, Json(ApiResponse::success(result)))
}

async fn reason_handler(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(req): Json<ReasonRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    if req.query.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("query must not be empty".into())),
        );
    }

    let credential = credential_from(&headers);
    let result = state.engine.reason(&req.snapshot, &req.query, &credential).await;

    (StatusCode::OK, Json(ApiResponse::success(result)))
}

async fn anomalies_handler(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> (StatusCode, Json<ApiResponse>) {
    let anomalies = state.engine.fetch_anomalies(&credential_from(&headers)).await;

    (
        StatusCode::OK,
        Json(ApiResponse::success(serde_json::json!({ "anomalies": anomalies }))),
    )
}

/// =============================
/// Router
/// =============================

pub fn create_router(engine: Arc<FinCoachEngine>) -> Router {
    let state = ApiState { engine };

    Router::new()
        .route("/health", get(health))
        .route("/api/score", post(score_handler))
        .route("/api/simulate", post(simulate_handler))
        .route("/api/reason", post(reason_handler))
        .route("/api/anomalies", get(anomalies_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(engine: Arc<FinCoachEngine>, port: u16) -> crate::Result<()> {
    let router = create_router(engine);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
