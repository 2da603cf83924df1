use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

use crate::engine::Engine;
use crate::observability::MetricsRegistry;
use crate::publish::{PublishError, RulePublisher};
use crate::store::RuleStore;

use super::request::{PublishRulesRequest, TransactionRequest};
use super::response::{
    ErrorResponse, HealthResponse, IngestResponse, PublishResponse, ReadyResponse,
};

/// Shared application state.
pub struct AppState {
    /// Routing front of the evaluation workers
    pub engine: Engine,

    /// Publisher feeding the rule bus
    pub publisher: RulePublisher,

    /// The API's own rule store replica, for readiness reporting
    pub store: Arc<RuleStore>,

    /// Metrics registry
    pub metrics: Arc<MetricsRegistry>,

    /// Application start time
    pub start_time: Instant,

    /// Application version
    pub version: String,
}

/// Create the application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/rules", post(handle_publish_rules))
        .route("/v1/transactions", post(handle_submit_transaction))
        .route("/health", get(handle_health))
        .route("/ready", get(handle_ready))
        .route("/metrics", get(handle_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Replace the active rule set.
///
/// The hand-off runs on its own task; awaiting the receipt here keeps the
/// management call synchronous for operators without blocking ingestion.
async fn handle_publish_rules(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PublishRulesRequest>,
) -> axum::response::Response {
    let receipt = state.publisher.publish(req.rules);

    match receipt.await {
        Ok(Ok(outcome)) => (
            StatusCode::OK,
            Json(PublishResponse::published(
                outcome.rule_count,
                outcome.replicas_reached,
            )),
        )
            .into_response(),
        Ok(Err(e @ PublishError::InvalidRuleSet(_))) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(e.to_string())),
        )
            .into_response(),
        Ok(Err(e @ PublishError::Handoff(_))) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::unavailable(e.to_string())),
        )
            .into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::internal_error("publish task vanished")),
        )
            .into_response(),
    }
}

/// Submit a transaction for evaluation.
async fn handle_submit_transaction(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TransactionRequest>,
) -> axum::response::Response {
    let tx = match req.into_transaction() {
        Ok(tx) => tx,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(e.to_string())),
            )
                .into_response()
        }
    };

    let transaction_id = tx.id.clone();
    match state.engine.submit(tx).await {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(IngestResponse::accepted(transaction_id)),
        )
            .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::unavailable(e.to_string())),
        )
            .into_response(),
    }
}

/// Health check endpoint.
async fn handle_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// Readiness check endpoint.
///
/// An absent rule set is a normal serving state (transactions pass
/// vacuously), so readiness never gates on rules being present.
async fn handle_ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ReadyResponse {
        ready: true,
        workers: state.engine.worker_count(),
        active_rules: state.store.active_rule_count(),
        applied_updates: state.store.applied_updates(),
    })
}

/// Metrics endpoint (Prometheus format).
async fn handle_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut body = state.metrics.to_prometheus();
    body.push_str(&format!(
        r#"
# HELP verdikt_uptime_seconds Application uptime in seconds
# TYPE verdikt_uptime_seconds counter
verdikt_uptime_seconds {}

# HELP verdikt_active_rules Rules in the currently applied set
# TYPE verdikt_active_rules gauge
verdikt_active_rules {}
"#,
        state.start_time.elapsed().as_secs(),
        state.store.active_rule_count(),
    ));

    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; charset=utf-8",
        )],
        body,
    )
}
