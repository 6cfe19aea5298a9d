//! DNA weighting model (full mode) and the pieces both modes share

use serde::Serialize;

use crate::brain::basic::BasicVotes;
use crate::brain::dna::AgentDna;
use crate::brain::signals::MarketSignals;

/// Contrarian bias above which the conclusion is faded
pub const CONTRARIAN_CUTOFF: f64 = 60.0;

/// Full-mode blend of indicator and price-action scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalBlend {
    /// RSI, MACD, moving averages and momentum
    pub technical_score: f64,
    /// Trend plus range position
    pub intuitive_score: f64,
    /// patternRecognition / 100
    pub pattern_weight: f64,
}

/// What produced the pre-contrarian signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SignalBasis {
    Full(SignalBlend),
    Basic(BasicVotes),
}

/// Weighted signal before the personality overlay
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedSignal {
    pub basis: SignalBasis,
    pub pre_contrarian: f64,
    /// Set when the contrarian fade was applied
    pub contrarian_factor: Option<f64>,
    pub raw_signal: f64,
    pub action_threshold: f64,
}

impl SignalBlend {
    pub fn compute(signals: &MarketSignals, dna: &AgentDna) -> Self {
        let technical_score = signals.rsi_signal * 0.30
            + signals.macd_signal * 0.25
            + signals.ma_signal * 0.25
            + signals.momentum * 0.20;

        let range_bias = if signals.price_position < 0.3 {
            0.3
        } else if signals.price_position > 0.7 {
            -0.3
        } else {
            0.0
        };
        let intuitive_score = signals.trend * 0.5 + range_bias;

        Self {
            technical_score,
            intuitive_score,
            pattern_weight: dna.pattern_recognition / 100.0,
        }
    }

    pub fn combined(&self) -> f64 {
        self.technical_score * self.pattern_weight
            + self.intuitive_score * (1.0 - self.pattern_weight)
    }
}

/// Fade strength for a contrarian bias, `None` at or below the cutoff
pub fn contrarian_factor(contrarian_bias: f64) -> Option<f64> {
    if contrarian_bias > CONTRARIAN_CUTOFF {
        Some((contrarian_bias / 100.0) * 2.0 - 1.0)
    } else {
        None
    }
}

/// Minimum |signal| needed to act, in [0.05, 0.45]
pub fn action_threshold(timing_sensitivity: f64) -> f64 {
    0.05 + (timing_sensitivity / 100.0) * 0.4
}

impl WeightedSignal {
    /// Apply the contrarian fade and attach the DNA threshold
    pub fn new(basis: SignalBasis, pre_contrarian: f64, dna: &AgentDna) -> Self {
        let factor = contrarian_factor(dna.contrarian_bias);
        let raw_signal = match factor {
            Some(f) => pre_contrarian * -f,
            None => pre_contrarian,
        };

        Self {
            basis,
            pre_contrarian,
            contrarian_factor: factor,
            raw_signal,
            action_threshold: action_threshold(dna.timing_sensitivity),
        }
    }
}

/// Full-mode weighting of already-extracted signals
pub fn weigh_full(signals: &MarketSignals, dna: &AgentDna) -> WeightedSignal {
    let blend = SignalBlend::compute(signals, dna);
    WeightedSignal::new(SignalBasis::Full(blend), blend.combined(), dna)
}
