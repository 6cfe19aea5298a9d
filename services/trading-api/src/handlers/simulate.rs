//! Simulate endpoint - dry-run decision with the full trace

use axum::{extract::State, Json};
use market_data::MarketSnapshot;
use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;

use crate::{
    brain::{AgentDna, Evaluation, Personality, PositionState},
    error::ApiError,
    observability::metrics,
    AppState,
};

/// Request to simulate a decision on caller-supplied data
#[derive(Debug, serde::Deserialize)]
pub struct SimulateRequest {
    #[serde(rename = "agentDNA", default)]
    pub agent_dna: AgentDna,
    pub market: MarketSnapshot,
    #[serde(default)]
    pub position: PositionState,
    #[serde(default)]
    pub personality: Option<Personality>,
    /// Seeds the random source so stochastic personalities replay
    #[serde(default)]
    pub seed: Option<u64>,
}

/// POST /api/simulate-decision - never executes
pub async fn simulate_decision(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SimulateRequest>,
) -> Result<Json<Evaluation>, ApiError> {
    state.metrics.increment(metrics::SIMULATIONS, 1).await;

    if req.market.symbol.trim().is_empty() {
        return Err(ApiError::BadRequest("market.symbol is required".to_string()));
    }

    let mut rng = match req.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let evaluation = state.engine.evaluate(
        &req.agent_dna,
        &req.market,
        &req.position,
        req.personality.unwrap_or_default(),
        &mut rng,
    );

    tracing::debug!(
        symbol = %req.market.symbol,
        action = %evaluation.decision.action,
        seed = ?req.seed,
        "Simulated decision"
    );

    Ok(Json(evaluation))
}
