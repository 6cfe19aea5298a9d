//! Personality overlay applied to the weighted signal

use serde::{Deserialize, Serialize};

use crate::brain::config::PersonalityConfig;
use crate::brain::random::RandomSource;

/// Behavioral overlay, exactly one per decision.
///
/// Parsing is case-insensitive and never fails: unknown tags become
/// `Adaptive`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Personality {
    Aggressive,
    Cautious,
    Deceptive,
    Chaotic,
    Calculating,
    #[default]
    Adaptive,
}

impl From<&str> for Personality {
    fn from(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "aggressive" => Personality::Aggressive,
            "cautious" => Personality::Cautious,
            "deceptive" => Personality::Deceptive,
            "chaotic" => Personality::Chaotic,
            "calculating" => Personality::Calculating,
            _ => Personality::Adaptive,
        }
    }
}

impl From<String> for Personality {
    fn from(tag: String) -> Self {
        Personality::from(tag.as_str())
    }
}

impl Personality {
    pub fn display_name(&self) -> &'static str {
        match self {
            Personality::Aggressive => "Aggressive",
            Personality::Cautious => "Cautious",
            Personality::Deceptive => "Deceptive",
            Personality::Chaotic => "Chaotic",
            Personality::Calculating => "Calculating",
            Personality::Adaptive => "Adaptive",
        }
    }

    /// Whether the overlay consumes random draws
    pub fn is_stochastic(&self) -> bool {
        matches!(self, Personality::Deceptive | Personality::Chaotic)
    }

    /// Adjust a weighted signal. Draws at most one value from `rng`, and only
    /// for stochastic personalities.
    pub fn apply(
        &self,
        signal: f64,
        config: &PersonalityConfig,
        rng: &mut dyn RandomSource,
    ) -> PersonalityAdjustment {
        let mut flipped = false;
        let mut noise = 0.0;

        let (adjusted, note) = match self {
            Personality::Aggressive => (
                signal + config.aggressive_bias,
                "aggressive bias pushes toward buying",
            ),
            Personality::Cautious => (
                signal + config.cautious_bias,
                "cautious bias holds back conviction",
            ),
            Personality::Deceptive => {
                if rng.next_unit() < config.deceptive_flip_probability {
                    flipped = true;
                    (-signal, "deceptive streak inverted the read")
                } else {
                    (signal, "deceptive streak kept the read")
                }
            }
            Personality::Chaotic => {
                noise = (rng.next_unit() * 2.0 - 1.0) * config.chaotic_noise;
                (signal + noise, "chaotic noise perturbed the read")
            }
            Personality::Calculating => (signal, "calculated read taken as is"),
            Personality::Adaptive => (signal, "adaptive read taken as is"),
        };

        PersonalityAdjustment {
            personality: *self,
            before: signal,
            after: adjusted.clamp(-1.0, 1.0),
            flipped,
            noise,
            note,
        }
    }
}

/// Result of the personality overlay
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalityAdjustment {
    pub personality: Personality,
    pub before: f64,
    /// Adjusted signal, clamped to [-1, 1]
    pub after: f64,
    pub flipped: bool,
    pub noise: f64,
    pub note: &'static str,
}
