//! Health check endpoints for load balancers and monitoring

use axum::{extract::State, http::StatusCode, Json};
use market_data::SourceHealth;
use serde::Serialize;
use std::sync::Arc;

use crate::observability::MetricsSnapshot;
use crate::AppState;

/// Basic health check - fast, no external dependencies
/// Use for load balancer health checks
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Detailed health check with the market provider and counters.
///
/// Always 200; a failing provider shows up as `degraded` since the engine
/// itself keeps working for dry runs.
pub async fn health_detail(State(state): State<Arc<AppState>>) -> Json<DetailedHealthResponse> {
    let source = state.market.health().await;
    let market_status = provider_status(&source);

    let checks = vec![
        HealthCheck {
            name: format!("market:{}", state.market.name()),
            status: market_status.to_string(),
            detail: source.last_error.clone(),
        },
        HealthCheck {
            name: format!("executor:{}", state.executor.name()),
            status: "ok".to_string(),
            detail: None,
        },
    ];

    let metrics = state.metrics.snapshot().await;

    Json(DetailedHealthResponse {
        status: if market_status == "error" { "degraded" } else { "healthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks,
        market: source,
        metrics: HealthMetrics {
            uptime_secs: metrics.uptime_secs,
            counters: metrics.counters,
        },
    })
}

/// GET /metrics - counter and gauge snapshot
pub async fn metrics(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot().await)
}

/// `idle` until the provider has served or failed a request
fn provider_status(source: &SourceHealth) -> &'static str {
    if source.is_healthy {
        "ok"
    } else if source.last_success.is_none() && source.success_rate >= 1.0 {
        "idle"
    } else {
        "error"
    }
}

#[derive(Serialize)]
pub struct DetailedHealthResponse {
    pub status: String,
    pub version: String,
    pub checks: Vec<HealthCheck>,
    pub market: SourceHealth,
    pub metrics: HealthMetrics,
}

#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Serialize)]
pub struct HealthMetrics {
    pub uptime_secs: u64,
    pub counters: std::collections::HashMap<String, u64>,
}
