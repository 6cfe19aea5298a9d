//! Engine tuning
//!
//! Every field has a default so a partial `[engine]` table deserializes.

use serde::{Deserialize, Serialize};

/// Decision engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Which decision path to use
    #[serde(default)]
    pub mode: EngineMode,
    /// Basic mode: chance of a minor directional action when no threshold is crossed
    #[serde(default = "default_activity_probability")]
    pub activity_probability: f64,
    /// Basic mode: 24h change (%) below which a held position is force-sold
    #[serde(default = "default_stop_loss_trigger_pct")]
    pub stop_loss_trigger_pct: f64,
    /// Personality overlay magnitudes
    #[serde(default)]
    pub personality: PersonalityConfig,
}

fn default_activity_probability() -> f64 {
    0.30
}

fn default_stop_loss_trigger_pct() -> f64 {
    -8.0
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: EngineMode::Auto,
            activity_probability: default_activity_probability(),
            stop_loss_trigger_pct: default_stop_loss_trigger_pct(),
            personality: PersonalityConfig::default(),
        }
    }
}

/// Decision path selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineMode {
    /// Full mode when the snapshot carries a technical panel, basic otherwise
    #[default]
    Auto,
    /// Always blend indicators (missing ones contribute 0)
    Full,
    /// Always use the 24h-range heuristic
    Basic,
}

/// Personality overlay magnitudes and probabilities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityConfig {
    #[serde(default = "default_aggressive_bias")]
    pub aggressive_bias: f64,
    #[serde(default = "default_cautious_bias")]
    pub cautious_bias: f64,
    #[serde(default = "default_deceptive_flip_probability")]
    pub deceptive_flip_probability: f64,
    /// Half-width of the uniform noise band
    #[serde(default = "default_chaotic_noise")]
    pub chaotic_noise: f64,
}

fn default_aggressive_bias() -> f64 {
    0.10
}

fn default_cautious_bias() -> f64 {
    -0.05
}

fn default_deceptive_flip_probability() -> f64 {
    0.15
}

fn default_chaotic_noise() -> f64 {
    0.15
}

impl Default for PersonalityConfig {
    fn default() -> Self {
        Self {
            aggressive_bias: default_aggressive_bias(),
            cautious_bias: default_cautious_bias(),
            deceptive_flip_probability: default_deceptive_flip_probability(),
            chaotic_noise: default_chaotic_noise(),
        }
    }
}

impl EngineConfig {
    /// No activity bias, no deceptive flips, no chaotic noise.
    ///
    /// Every personality becomes a pure function of its inputs, which is what
    /// backtests want.
    pub fn deterministic() -> Self {
        Self {
            activity_probability: 0.0,
            personality: PersonalityConfig {
                deceptive_flip_probability: 0.0,
                chaotic_noise: 0.0,
                ..PersonalityConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: EngineMode) -> Self {
        self.mode = mode;
        self
    }

    /// Probabilities clamped to [0, 1], noise made non-negative, non-finite
    /// values replaced by their defaults
    pub fn normalized(&self) -> Self {
        fn finite_or(value: f64, fallback: f64) -> f64 {
            if value.is_finite() {
                value
            } else {
                fallback
            }
        }

        let p = &self.personality;
        Self {
            mode: self.mode,
            activity_probability: finite_or(self.activity_probability, default_activity_probability())
                .clamp(0.0, 1.0),
            stop_loss_trigger_pct: finite_or(self.stop_loss_trigger_pct, default_stop_loss_trigger_pct()),
            personality: PersonalityConfig {
                aggressive_bias: finite_or(p.aggressive_bias, default_aggressive_bias()),
                cautious_bias: finite_or(p.cautious_bias, default_cautious_bias()),
                deceptive_flip_probability: finite_or(
                    p.deceptive_flip_probability,
                    default_deceptive_flip_probability(),
                )
                .clamp(0.0, 1.0),
                chaotic_noise: finite_or(p.chaotic_noise, default_chaotic_noise()).abs(),
            },
        }
    }
}
