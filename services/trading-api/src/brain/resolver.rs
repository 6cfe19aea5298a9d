//! Decision resolver - signal and threshold to action, size and levels

use serde::Serialize;

use crate::brain::decision::TradeAction;
use crate::brain::dna::AgentDna;
use crate::brain::position::PositionPhase;

/// Largest share of cash (BUY) or tokens (SELL) committed in one decision
pub const MAX_POSITION_PCT: f64 = 50.0;

/// Stop-loss and take-profit distances in percent of price
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskProfile {
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
}

impl RiskProfile {
    pub fn from_dna(dna: &AgentDna) -> Self {
        let risk = dna.risk_tolerance / 100.0;
        Self {
            stop_loss_pct: 2.0 + risk * 8.0,
            take_profit_pct: 3.0 + (1.0 - risk) * 12.0,
        }
    }

    /// (stop_loss, take_profit) price levels for an action; none for HOLD
    pub fn levels(&self, action: TradeAction, price: f64) -> Option<(f64, f64)> {
        let sl = self.stop_loss_pct / 100.0;
        let tp = self.take_profit_pct / 100.0;
        match action {
            TradeAction::Buy => Some((price * (1.0 - sl), price * (1.0 + tp))),
            TradeAction::Sell => Some((price * (1.0 + sl), price * (1.0 - tp))),
            TradeAction::Hold => None,
        }
    }
}

/// Everything the resolver decided
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub action: TradeAction,
    pub phase: PositionPhase,
    pub signal: f64,
    pub threshold: f64,
    pub forced_exit: bool,
    pub confidence: f64,
    /// Percent of cash (BUY) or held tokens (SELL); 0 for HOLD
    pub suggested_amount: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub risk: RiskProfile,
}

/// Action for a signal given the position phase.
///
/// Flat: BUY or HOLD. Holding: SELL, BUY (averaging in) or HOLD. A forced
/// exit is always a SELL.
pub fn select_action(signal: f64, threshold: f64, phase: PositionPhase, forced_exit: bool) -> TradeAction {
    match phase {
        PositionPhase::Holding if forced_exit => TradeAction::Sell,
        PositionPhase::Holding if signal < -threshold => TradeAction::Sell,
        _ if signal > threshold => TradeAction::Buy,
        _ => TradeAction::Hold,
    }
}

/// Confidence in [10, 98], one decimal
pub fn confidence(signal: f64, dna: &AgentDna) -> f64 {
    let base = (signal.abs() * 100.0).min(95.0);
    let value = (base + dna.pattern_recognition / 100.0 * 15.0).clamp(10.0, 98.0);
    (value * 10.0).round() / 10.0
}

/// Position size in [0, 50] percent, two decimals
pub fn position_size(confidence: f64, dna: &AgentDna) -> f64 {
    let size = ((5.0 + 45.0 * dna.aggression / 100.0) * confidence / 100.0).min(MAX_POSITION_PCT);
    (size.max(0.0) * 100.0).round() / 100.0
}

pub fn resolve(
    signal: f64,
    threshold: f64,
    forced_exit: bool,
    dna: &AgentDna,
    phase: PositionPhase,
    price: f64,
) -> Resolution {
    let action = select_action(signal, threshold, phase, forced_exit);
    let confidence = confidence(signal, dna);
    let risk = RiskProfile::from_dna(dna);

    let (suggested_amount, levels) = match action {
        TradeAction::Hold => (0.0, None),
        _ => (position_size(confidence, dna), risk.levels(action, price)),
    };

    Resolution {
        action,
        phase,
        signal,
        threshold,
        forced_exit: forced_exit && phase == PositionPhase::Holding,
        confidence,
        suggested_amount,
        stop_loss: levels.map(|(sl, _)| sl),
        take_profit: levels.map(|(_, tp)| tp),
        risk,
    }
}
