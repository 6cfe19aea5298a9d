//! Agent DNA - the five traits that shape every decision

use serde::{Deserialize, Serialize};

/// Five trait values on a 0-100 scale.
///
/// Missing fields deserialize to the neutral 50. Values are not trusted:
/// the engine always works on [`AgentDna::clamped`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDna {
    /// Width of stop-loss / take-profit bands
    #[serde(default = "default_trait")]
    pub risk_tolerance: f64,
    /// Position size magnitude
    #[serde(default = "default_trait")]
    pub aggression: f64,
    /// Weight of indicators versus price action
    #[serde(default = "default_trait")]
    pub pattern_recognition: f64,
    /// Conviction needed before acting
    #[serde(default = "default_trait")]
    pub timing_sensitivity: f64,
    /// Above 60 the conclusion is faded
    #[serde(default = "default_trait")]
    pub contrarian_bias: f64,
}

fn default_trait() -> f64 {
    50.0
}

impl Default for AgentDna {
    fn default() -> Self {
        Self::new(50.0, 50.0, 50.0, 50.0, 50.0)
    }
}

/// Trait identifiers, used when explaining a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DnaTrait {
    RiskTolerance,
    Aggression,
    PatternRecognition,
    TimingSensitivity,
    ContrarianBias,
}

impl DnaTrait {
    pub fn display_name(&self) -> &'static str {
        match self {
            DnaTrait::RiskTolerance => "risk tolerance",
            DnaTrait::Aggression => "aggression",
            DnaTrait::PatternRecognition => "pattern recognition",
            DnaTrait::TimingSensitivity => "timing sensitivity",
            DnaTrait::ContrarianBias => "contrarian bias",
        }
    }
}

impl AgentDna {
    pub fn new(
        risk_tolerance: f64,
        aggression: f64,
        pattern_recognition: f64,
        timing_sensitivity: f64,
        contrarian_bias: f64,
    ) -> Self {
        Self {
            risk_tolerance,
            aggression,
            pattern_recognition,
            timing_sensitivity,
            contrarian_bias,
        }
    }

    /// Build from traits stored as fractions in [0, 1]
    pub fn from_fractions(
        risk_tolerance: f64,
        aggression: f64,
        pattern_recognition: f64,
        timing_sensitivity: f64,
        contrarian_bias: f64,
    ) -> Self {
        Self::new(
            risk_tolerance * 100.0,
            aggression * 100.0,
            pattern_recognition * 100.0,
            timing_sensitivity * 100.0,
            contrarian_bias * 100.0,
        )
    }

    /// Every trait forced into [0, 100]; NaN becomes 0
    pub fn clamped(&self) -> Self {
        fn clamp_trait(value: f64) -> f64 {
            if value.is_nan() {
                0.0
            } else {
                value.clamp(0.0, 100.0)
            }
        }

        Self {
            risk_tolerance: clamp_trait(self.risk_tolerance),
            aggression: clamp_trait(self.aggression),
            pattern_recognition: clamp_trait(self.pattern_recognition),
            timing_sensitivity: clamp_trait(self.timing_sensitivity),
            contrarian_bias: clamp_trait(self.contrarian_bias),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.traits()
            .iter()
            .all(|(_, value)| (0.0..=100.0).contains(value))
    }

    pub fn traits(&self) -> [(DnaTrait, f64); 5] {
        [
            (DnaTrait::RiskTolerance, self.risk_tolerance),
            (DnaTrait::Aggression, self.aggression),
            (DnaTrait::PatternRecognition, self.pattern_recognition),
            (DnaTrait::TimingSensitivity, self.timing_sensitivity),
            (DnaTrait::ContrarianBias, self.contrarian_bias),
        ]
    }

    /// The `n` strongest traits, strongest first. Ties keep declaration order.
    pub fn dominant_traits(&self, n: usize) -> Vec<(DnaTrait, f64)> {
        let mut traits = self.clamped().traits().to_vec();
        traits.sort_by(|a, b| b.1.total_cmp(&a.1));
        traits.truncate(n);
        traits
    }

    pub fn dominant_trait(&self) -> DnaTrait {
        self.dominant_traits(1)
            .first()
            .map(|(t, _)| *t)
            .unwrap_or(DnaTrait::RiskTolerance)
    }
}
