//! Brain engine - single evaluation path for both decision modes
//!
//! extract signals -> weigh (full or basic) -> personality overlay ->
//! resolve -> compose rationale. The engine holds only its configuration;
//! every call works on the caller's snapshot and random source.

use market_data::MarketSnapshot;
use serde::Serialize;
use tracing::debug;

use crate::brain::{
    basic::weigh_basic,
    config::{EngineConfig, EngineMode},
    decision::TradingDecision,
    dna::AgentDna,
    personality::{Personality, PersonalityAdjustment},
    position::{PositionPhase, PositionState},
    random::RandomSource,
    rationale,
    resolver::{resolve, Resolution},
    signals::{finite_or_zero, MarketSignals},
    weighting::{weigh_full, SignalBasis, WeightedSignal},
};

/// How far past the threshold an activity nudge lands
const ACTIVITY_NUDGE_MARGIN: f64 = 0.01;

/// Decision path actually taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionMode {
    Full,
    Basic,
}

impl DecisionMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            DecisionMode::Full => "full",
            DecisionMode::Basic => "basic",
        }
    }
}

/// Every intermediate of one decision
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionTrace {
    pub mode: DecisionMode,
    pub symbol: String,
    pub current_price: f64,
    pub price_change_24h: f64,
    /// DNA after clamping
    pub dna: AgentDna,
    pub signals: MarketSignals,
    pub weighted: WeightedSignal,
    pub personality: PersonalityAdjustment,
    /// Basic mode moved a sub-threshold signal past the threshold
    pub activity_nudge: bool,
    pub final_signal: f64,
    pub resolution: Resolution,
}

/// Decision plus the trace that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub decision: TradingDecision,
    pub trace: DecisionTrace,
}

/// Brain engine - maps DNA, market and position to a decision
#[derive(Debug, Clone, Default)]
pub struct BrainEngine {
    config: EngineConfig,
}

impl BrainEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: config.normalized(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn select_mode(&self, market: &MarketSnapshot) -> DecisionMode {
        match self.config.mode {
            EngineMode::Full => DecisionMode::Full,
            EngineMode::Basic => DecisionMode::Basic,
            EngineMode::Auto if market.has_technical_panel() => DecisionMode::Full,
            EngineMode::Auto => DecisionMode::Basic,
        }
    }

    /// Evaluate one decision.
    ///
    /// Random draws happen in a fixed order (personality, then activity bias)
    /// so equal inputs and an equal random stream give an equal result.
    pub fn evaluate(
        &self,
        dna: &AgentDna,
        market: &MarketSnapshot,
        position: &PositionState,
        personality: Personality,
        rng: &mut dyn RandomSource,
    ) -> Evaluation {
        let dna = dna.clamped();
        let position = position.sanitized();
        let mode = self.select_mode(market);
        let signals = MarketSignals::extract(market);

        let weighted = match mode {
            DecisionMode::Full => weigh_full(&signals, &dna),
            DecisionMode::Basic => weigh_basic(
                market,
                &signals,
                &dna,
                &position,
                self.config.stop_loss_trigger_pct,
            ),
        };

        let adjustment = personality.apply(weighted.raw_signal, &self.config.personality, rng);
        let threshold = weighted.action_threshold;
        let (forced_exit, rule_fired) = match &weighted.basis {
            SignalBasis::Basic(votes) => (votes.stop_loss_triggered, votes.rule.is_some()),
            SignalBasis::Full(_) => (false, false),
        };

        let mut final_signal = adjustment.after;
        let mut activity_nudge = false;
        if mode == DecisionMode::Basic
            && !forced_exit
            && !rule_fired
            && final_signal.abs() <= threshold
            && self.config.activity_probability > 0.0
        {
            let direction = if final_signal > 0.0 {
                1.0
            } else if final_signal < 0.0 {
                -1.0
            } else if signals.price_position < 0.5 {
                1.0
            } else {
                -1.0
            };
            // A flat position has nothing to sell
            let tradable = direction > 0.0 || position.phase() == PositionPhase::Holding;
            if tradable && rng.next_unit() < self.config.activity_probability {
                final_signal = direction * (threshold + ACTIVITY_NUDGE_MARGIN);
                activity_nudge = true;
            }
        }

        let current_price = finite_or_zero(market.current_price);
        let resolution = resolve(
            final_signal,
            threshold,
            forced_exit,
            &dna,
            position.phase(),
            current_price,
        );

        let trace = DecisionTrace {
            mode,
            symbol: market.symbol.clone(),
            current_price,
            price_change_24h: finite_or_zero(market.price_change_24h),
            dna,
            signals,
            weighted,
            personality: adjustment,
            activity_nudge,
            final_signal,
            resolution,
        };

        let text = rationale::compose(&trace);
        let mut decision = TradingDecision::new(resolution.action, resolution.confidence)
            .with_position_size(resolution.suggested_amount)
            .with_rationale(text.reasoning, text.technical_analysis, text.risk_assessment);
        if let Some(stop_loss) = resolution.stop_loss {
            decision = decision.with_stop_loss(stop_loss);
        }
        if let Some(take_profit) = resolution.take_profit {
            decision = decision.with_take_profit(take_profit);
        }

        debug!(
            symbol = %trace.symbol,
            mode = mode.display_name(),
            signal = final_signal,
            threshold,
            action = %decision.action,
            confidence = decision.confidence,
            "decision evaluated"
        );

        Evaluation { decision, trace }
    }

    pub fn decide(
        &self,
        dna: &AgentDna,
        market: &MarketSnapshot,
        position: &PositionState,
        personality: Personality,
        rng: &mut dyn RandomSource,
    ) -> TradingDecision {
        self.evaluate(dna, market, position, personality, rng).decision
    }
}

/// Decide with the default engine configuration
pub fn decide(
    dna: &AgentDna,
    market: &MarketSnapshot,
    position: &PositionState,
    personality: Personality,
    rng: &mut dyn RandomSource,
) -> TradingDecision {
    BrainEngine::default().decide(dna, market, position, personality, rng)
}
