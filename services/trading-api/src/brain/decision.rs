//! Trading decision - output of the brain engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete trading action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    #[serde(alias = "buy", alias = "Buy")]
    Buy,
    #[serde(alias = "sell", alias = "Sell")]
    Sell,
    #[serde(alias = "hold", alias = "Hold")]
    Hold,
}

impl TradeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeAction::Buy => "BUY",
            TradeAction::Sell => "SELL",
            TradeAction::Hold => "HOLD",
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trading decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingDecision {
    pub action: TradeAction,
    /// 10 to 98
    pub confidence: f64,
    /// BUY: % of cash to commit. SELL: % of held tokens. HOLD: 0.
    pub suggested_amount: f64,
    pub reasoning: String,
    pub technical_analysis: String,
    pub risk_assessment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<f64>,
}

impl TradingDecision {
    pub fn new(action: TradeAction, confidence: f64) -> Self {
        Self {
            action,
            confidence,
            suggested_amount: 0.0,
            reasoning: String::new(),
            technical_analysis: String::new(),
            risk_assessment: String::new(),
            stop_loss: None,
            take_profit: None,
        }
    }

    pub fn hold(confidence: f64) -> Self {
        Self::new(TradeAction::Hold, confidence)
    }

    pub fn with_position_size(mut self, pct: f64) -> Self {
        self.suggested_amount = pct;
        self
    }

    pub fn with_stop_loss(mut self, stop_loss: f64) -> Self {
        self.stop_loss = Some(stop_loss);
        self
    }

    pub fn with_take_profit(mut self, take_profit: f64) -> Self {
        self.take_profit = Some(take_profit);
        self
    }

    pub fn with_rationale(
        mut self,
        reasoning: String,
        technical_analysis: String,
        risk_assessment: String,
    ) -> Self {
        self.reasoning = reasoning;
        self.technical_analysis = technical_analysis;
        self.risk_assessment = risk_assessment;
        self
    }

    /// Worth sending to an executor
    pub fn is_actionable(&self, min_confidence: f64) -> bool {
        self.confidence >= min_confidence && self.action != TradeAction::Hold
    }
}
