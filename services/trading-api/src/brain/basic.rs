//! Basic mode - 24h change and daily-range heuristic
//!
//! Used when the snapshot has no technical panel. Each rule casts a vote and
//! the votes are summed into one signal in [-1, 1]. A crossed dip or profit
//! threshold, or a price inside a zone, also fixes the direction: the signal
//! is pushed past the DNA action threshold that way.

use market_data::MarketSnapshot;
use serde::Serialize;

use crate::brain::dna::AgentDna;
use crate::brain::position::{PositionPhase, PositionState};
use crate::brain::signals::{finite_or_zero, MarketSignals};
use crate::brain::weighting::{action_threshold, SignalBasis, WeightedSignal};

const DIP_VOTE: f64 = 0.35;
const PROFIT_VOTE: f64 = 0.35;
const ZONE_BASE_VOTE: f64 = 0.10;
const ZONE_DEPTH_VOTE: f64 = 0.25;
const RSI_VOTE_SCALE: f64 = 0.4;
/// How far past the action threshold a fired rule puts the signal
pub const RULE_MARGIN: f64 = 0.01;

/// DNA-derived cutoffs
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicThresholds {
    /// 24h change (%) at or below which a dip is bought, -1 to -5
    pub dip_pct: f64,
    /// 24h change (%) at or above which profit is taken, 2 to 8
    pub profit_pct: f64,
    /// Range position below which price is cheap, 0.45 to 0.60
    pub buy_zone: f64,
    /// Range position above which price is rich, 0.45 to 0.55
    pub sell_zone: f64,
}

impl BasicThresholds {
    pub fn from_dna(dna: &AgentDna) -> Self {
        let aggression = dna.aggression / 100.0;
        let risk = dna.risk_tolerance / 100.0;
        Self {
            dip_pct: -(1.0 + (1.0 - aggression) * 4.0),
            profit_pct: 2.0 + risk * 6.0,
            buy_zone: 0.45 + aggression * 0.15,
            sell_zone: 0.45 + risk * 0.10,
        }
    }
}

/// Rule that set the basic-mode direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BasicRule {
    Dip,
    Profit,
    BuyZone,
    SellZone,
}

impl BasicRule {
    pub fn direction(&self) -> f64 {
        match self {
            BasicRule::Dip | BasicRule::BuyZone => 1.0,
            BasicRule::Profit | BasicRule::SellZone => -1.0,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BasicRule::Dip => "dip",
            BasicRule::Profit => "profit-taking",
            BasicRule::BuyZone => "buy zone",
            BasicRule::SellZone => "sell zone",
        }
    }

    /// 24h change rules win over zones; overlapping zones go to the deeper one
    fn select(dip: f64, profit: f64, buy_zone: f64, sell_zone: f64) -> Option<Self> {
        if dip > 0.0 {
            Some(BasicRule::Dip)
        } else if profit < 0.0 {
            Some(BasicRule::Profit)
        } else {
            let zones = buy_zone + sell_zone;
            match (buy_zone > 0.0, sell_zone < 0.0) {
                (true, false) => Some(BasicRule::BuyZone),
                (false, true) => Some(BasicRule::SellZone),
                (true, true) if zones > 0.0 => Some(BasicRule::BuyZone),
                (true, true) if zones < 0.0 => Some(BasicRule::SellZone),
                _ => None,
            }
        }
    }
}

/// Individual votes, their sum and the rule-adjusted total
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicVotes {
    pub thresholds: BasicThresholds,
    pub dip: f64,
    pub profit: f64,
    pub buy_zone: f64,
    pub sell_zone: f64,
    pub rsi: f64,
    /// Clamped sum of the votes
    pub vote_sum: f64,
    pub rule: Option<BasicRule>,
    /// Vote sum, pushed past the action threshold when a rule fired
    pub total: f64,
    /// Holding through a drop beyond the stop-loss trigger
    pub stop_loss_triggered: bool,
}

impl BasicVotes {
    pub fn tally(
        market: &MarketSnapshot,
        signals: &MarketSignals,
        dna: &AgentDna,
        position: &PositionState,
        stop_loss_trigger_pct: f64,
    ) -> Self {
        let thresholds = BasicThresholds::from_dna(dna);
        let change = finite_or_zero(market.price_change_24h);
        let pos = signals.price_position;

        let dip = if change <= thresholds.dip_pct { DIP_VOTE } else { 0.0 };
        let profit = if change >= thresholds.profit_pct {
            -PROFIT_VOTE
        } else {
            0.0
        };

        let buy_zone = if pos < thresholds.buy_zone {
            ZONE_BASE_VOTE + ZONE_DEPTH_VOTE * (thresholds.buy_zone - pos) / thresholds.buy_zone
        } else {
            0.0
        };
        let sell_zone = if pos > thresholds.sell_zone {
            -(ZONE_BASE_VOTE
                + ZONE_DEPTH_VOTE * (pos - thresholds.sell_zone) / (1.0 - thresholds.sell_zone))
        } else {
            0.0
        };

        let rsi = signals.rsi_signal * RSI_VOTE_SCALE * (dna.pattern_recognition / 100.0);

        let stop_loss_triggered =
            position.phase() == PositionPhase::Holding && change < stop_loss_trigger_pct;

        let vote_sum = (dip + profit + buy_zone + sell_zone + rsi).clamp(-1.0, 1.0);
        let rule = BasicRule::select(dip, profit, buy_zone, sell_zone);
        let floor = action_threshold(dna.timing_sensitivity) + RULE_MARGIN;
        let total = match rule {
            Some(r) if r.direction() > 0.0 => vote_sum.max(floor),
            Some(_) => vote_sum.min(-floor),
            None => vote_sum,
        }
        .clamp(-1.0, 1.0);

        Self {
            thresholds,
            dip,
            profit,
            buy_zone,
            sell_zone,
            rsi,
            vote_sum,
            rule,
            total,
            stop_loss_triggered,
        }
    }
}

/// Basic-mode weighting, contrarian fade included
pub fn weigh_basic(
    market: &MarketSnapshot,
    signals: &MarketSignals,
    dna: &AgentDna,
    position: &PositionState,
    stop_loss_trigger_pct: f64,
) -> WeightedSignal {
    let votes = BasicVotes::tally(market, signals, dna, position, stop_loss_trigger_pct);
    WeightedSignal::new(SignalBasis::Basic(votes), votes.total, dna)
}
