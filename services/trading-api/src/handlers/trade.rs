//! Trade handlers - decide-and-execute and the force-execute path

use axum::{extract::State, Json};
use market_data::{symbols, MarketDataError, MarketSnapshot};
use rand::{rngs::StdRng, SeedableRng};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::{
    brain::{AgentDna, Personality, PositionState, TradeAction, TradingDecision},
    error::ApiError,
    execution::{ExecutorError, TradeReceipt, TradeRequest},
    observability::{metrics, Logger},
    paper::{price_decimal, token_amount, usdc_amount},
    AppState,
};

/// Request to decide and, when warranted, trade
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartTradeRequest {
    pub symbol: String,
    pub agent_id: String,
    pub user_address: String,
    #[serde(rename = "agentDNA", default)]
    pub agent_dna: AgentDna,
    #[serde(default)]
    pub personality: Option<Personality>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartTradeResponse {
    pub decision: TradingDecision,
    pub market_data: MarketSnapshot,
    pub positions: PositionState,
    pub trade: TradeOutcome,
}

/// What happened on the execution leg
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeOutcome {
    pub executed: bool,
    pub tx_hash: Option<String>,
    pub new_balance: Option<f64>,
    pub tokens_traded: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TradeOutcome {
    fn skipped() -> Self {
        Self::default()
    }

    fn filled(receipt: TradeReceipt) -> Self {
        Self {
            executed: true,
            tx_hash: Some(receipt.tx_hash),
            new_balance: receipt.new_usdc_balance.to_f64(),
            tokens_traded: receipt.tokens_traded.to_f64(),
            error: None,
        }
    }

    fn failed(error: &ExecutorError) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

/// Force-execute request; the engine is not consulted
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteTradeRequest {
    pub action: TradeAction,
    pub symbol: String,
    #[serde(rename = "amountUSDC")]
    pub amount_usdc: f64,
    pub agent_id: String,
    pub user_address: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteTradeResponse {
    pub action: TradeAction,
    pub symbol: String,
    pub price: f64,
    pub trade: TradeOutcome,
}

#[derive(Debug, Serialize)]
pub struct SymbolsResponse {
    pub symbols: Vec<&'static str>,
}

/// POST /api/smart-trade
pub async fn smart_trade(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SmartTradeRequest>,
) -> Result<Json<SmartTradeResponse>, ApiError> {
    state.metrics.increment(metrics::API_REQUESTS, 1).await;

    let symbol = validate_symbol(&req.symbol)?;
    validate_agent_id(&req.agent_id)?;
    validate_address(&req.user_address)?;

    let market = fetch_snapshot(&state, &symbol).await?;
    let position = state
        .positions
        .position(&req.user_address, &req.agent_id, &symbol, market.current_price)
        .await
        .map_err(|e| {
            warn!(agent_id = %req.agent_id, symbol = %symbol, error = %e, "Position lookup failed");
            ApiError::UpstreamUnavailable(e.to_string())
        });
    let position = match position {
        Ok(position) => position,
        Err(e) => {
            state.metrics.increment(metrics::POSITION_ERRORS, 1).await;
            return Err(e);
        }
    };

    let personality = req.personality.unwrap_or_default();
    let decision = {
        let mut rng = StdRng::from_entropy();
        state
            .engine
            .decide(&req.agent_dna, &market, &position, personality, &mut rng)
    };
    state.metrics.record_decision(decision.action).await;
    Logger::decision_event(&req.agent_id, &symbol, decision.action, decision.confidence);

    let trade = if decision.is_actionable(state.trading.min_execute_confidence) {
        let outcome = match build_request(&req, &symbol, &decision, &market, &position) {
            Ok(request) => state.executor.execute(&request).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(receipt) => {
                state.metrics.increment(metrics::TRADE_EXECUTED, 1).await;
                Logger::trade_event(&req.agent_id, &symbol, decision.action, "executed");
                TradeOutcome::filled(receipt)
            }
            Err(e) => {
                state.metrics.increment(metrics::TRADE_FAILED, 1).await;
                warn!(
                    agent_id = %req.agent_id,
                    symbol = %symbol,
                    executor = state.executor.name(),
                    error = %e,
                    "Trade failed after decision"
                );
                Logger::trade_event(&req.agent_id, &symbol, decision.action, "failed");
                TradeOutcome::failed(&e)
            }
        }
    } else {
        state.metrics.increment(metrics::TRADE_SKIPPED, 1).await;
        TradeOutcome::skipped()
    };

    Ok(Json(SmartTradeResponse {
        decision,
        market_data: market,
        positions: position,
        trade,
    }))
}

/// POST /api/execute-trade
pub async fn execute_trade(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExecuteTradeRequest>,
) -> Result<Json<ExecuteTradeResponse>, ApiError> {
    state.metrics.increment(metrics::API_REQUESTS, 1).await;

    if req.action == TradeAction::Hold {
        return Err(ApiError::BadRequest("action must be BUY or SELL".to_string()));
    }
    if !req.amount_usdc.is_finite() || req.amount_usdc <= 0.0 {
        return Err(ApiError::BadRequest(format!(
            "amountUSDC must be positive, got {}",
            req.amount_usdc
        )));
    }
    let symbol = validate_symbol(&req.symbol)?;
    validate_agent_id(&req.agent_id)?;
    validate_address(&req.user_address)?;

    let market = fetch_snapshot(&state, &symbol).await?;
    let request = TradeRequest {
        agent_id: req.agent_id.clone(),
        owner: req.user_address.clone(),
        symbol: symbol.clone(),
        side: req.action,
        amount: usdc_amount(req.amount_usdc)?,
        price: price_decimal(market.current_price)?,
    };

    let receipt = match state.executor.execute(&request).await {
        Ok(receipt) => receipt,
        Err(e) => {
            state.metrics.increment(metrics::TRADE_FAILED, 1).await;
            Logger::trade_event(&req.agent_id, &symbol, req.action, "failed");
            return Err(e.into());
        }
    };
    state.metrics.increment(metrics::TRADE_EXECUTED, 1).await;
    Logger::trade_event(&req.agent_id, &symbol, req.action, "forced");

    Ok(Json(ExecuteTradeResponse {
        action: req.action,
        symbol,
        price: market.current_price,
        trade: TradeOutcome::filled(receipt),
    }))
}

/// GET /api/symbols
pub async fn list_symbols() -> Json<SymbolsResponse> {
    Json(SymbolsResponse {
        symbols: symbols::supported_symbols(),
    })
}

/// Size the trade from the decision: BUY spends a share of cash, SELL sells a
/// share of the held tokens.
fn build_request(
    req: &SmartTradeRequest,
    symbol: &str,
    decision: &TradingDecision,
    market: &MarketSnapshot,
    position: &PositionState,
) -> Result<TradeRequest, ExecutorError> {
    let fraction = decision.suggested_amount / 100.0;
    let amount = match decision.action {
        TradeAction::Sell => token_amount(position.token_amount * fraction)?,
        _ => usdc_amount(position.usdc_balance * fraction)?,
    };

    Ok(TradeRequest {
        agent_id: req.agent_id.clone(),
        owner: req.user_address.clone(),
        symbol: symbol.to_string(),
        side: decision.action,
        amount,
        price: price_decimal(market.current_price)?,
    })
}

/// Fetch a snapshot within the configured deadline
async fn fetch_snapshot(state: &AppState, symbol: &str) -> Result<MarketSnapshot, ApiError> {
    let started = Instant::now();
    let result = tokio::time::timeout(state.market_timeout, state.market.snapshot(symbol)).await;
    state
        .metrics
        .gauge(metrics::MARKET_DATA_LATENCY_MS, started.elapsed().as_millis() as f64)
        .await;

    let error = match result {
        Ok(Ok(snapshot)) => {
            info!(symbol = %symbol, price = snapshot.current_price, source = state.market.name(), "Market snapshot fetched");
            return Ok(snapshot);
        }
        Ok(Err(MarketDataError::UnsupportedSymbol(s))) => return Err(ApiError::UnsupportedSymbol(s)),
        Ok(Err(e)) => e.to_string(),
        Err(_) => format!("{} timed out after {:?}", state.market.name(), state.market_timeout),
    };

    state.metrics.increment(metrics::MARKET_DATA_ERRORS, 1).await;
    warn!(symbol = %symbol, error = %error, "Market data unavailable");
    Err(ApiError::UpstreamUnavailable(error))
}

fn validate_symbol(raw: &str) -> Result<String, ApiError> {
    let symbol = symbols::normalize(raw);
    if symbol.is_empty() || !symbols::is_supported(&symbol) {
        return Err(ApiError::UnsupportedSymbol(raw.to_string()));
    }
    Ok(symbol)
}

fn validate_agent_id(agent_id: &str) -> Result<(), ApiError> {
    if agent_id.trim().is_empty() {
        return Err(ApiError::BadRequest("agentId is required".to_string()));
    }
    Ok(())
}

/// Accepts an EVM address (0x + 20 bytes hex) or a Solana address (base58,
/// 32 bytes)
pub fn validate_address(address: &str) -> Result<(), ApiError> {
    let valid = match address.strip_prefix("0x") {
        Some(body) => hex::decode(body).map(|b| b.len() == 20).unwrap_or(false),
        None => bs58::decode(address)
            .into_vec()
            .map(|b| b.len() == 32)
            .unwrap_or(false),
    };
    if !valid {
        return Err(ApiError::BadRequest(format!("Invalid userAddress: {}", address)));
    }
    Ok(())
}
