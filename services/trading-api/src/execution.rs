//! Trade execution collaborator

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::brain::TradeAction;

/// How much to trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "unit", content = "value", rename_all = "lowercase")]
pub enum TradeAmount {
    /// Quote-currency notional
    Usdc(Decimal),
    /// Base-token quantity
    Tokens(Decimal),
}

/// One trade to execute
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRequest {
    pub agent_id: String,
    pub owner: String,
    pub symbol: String,
    pub side: TradeAction,
    pub amount: TradeAmount,
    /// Reference price for the fill
    pub price: Decimal,
}

/// Result of a filled trade
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeReceipt {
    pub tx_hash: String,
    pub new_usdc_balance: Decimal,
    pub tokens_traded: Decimal,
    pub executed_price: Decimal,
}

#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error("Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Decimal, available: Decimal },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(Decimal),

    #[error("Trade rejected: {0}")]
    Rejected(String),

    #[error("Executor unavailable: {0}")]
    Unavailable(String),
}

impl ExecutorError {
    /// The executor declined the trade, as opposed to failing to reach a venue
    pub fn is_refusal(&self) -> bool {
        !matches!(self, ExecutorError::Unavailable(_))
    }
}

/// Applies a trade and reports the new balances.
#[async_trait]
pub trait TradeExecutor: Send + Sync {
    async fn execute(&self, request: &TradeRequest) -> Result<TradeReceipt, ExecutorError>;

    fn name(&self) -> &str;
}
