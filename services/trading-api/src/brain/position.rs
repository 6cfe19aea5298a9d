//! Caller-supplied position snapshot

use serde::{Deserialize, Serialize};

/// Holdings of one token plus available cash, as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionState {
    #[serde(default)]
    pub has_position: bool,
    #[serde(default)]
    pub token_amount: f64,
    /// token_amount x current price
    #[serde(default, rename = "tokenValueUSD")]
    pub token_value_usd: f64,
    #[serde(default)]
    pub usdc_balance: f64,
}

/// Whether the agent currently holds the token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionPhase {
    Flat,
    Holding,
}

impl PositionState {
    pub fn flat(usdc_balance: f64) -> Self {
        Self {
            has_position: false,
            token_amount: 0.0,
            token_value_usd: 0.0,
            usdc_balance,
        }
    }

    pub fn holding(token_amount: f64, price: f64, usdc_balance: f64) -> Self {
        Self {
            has_position: token_amount > 0.0,
            token_amount,
            token_value_usd: token_amount * price,
            usdc_balance,
        }
    }

    pub fn phase(&self) -> PositionPhase {
        if self.has_position {
            PositionPhase::Holding
        } else {
            PositionPhase::Flat
        }
    }

    /// Negative or non-finite amounts read as zero
    pub fn sanitized(&self) -> Self {
        fn non_negative(value: f64) -> f64 {
            if value.is_finite() {
                value.max(0.0)
            } else {
                0.0
            }
        }

        Self {
            has_position: self.has_position,
            token_amount: non_negative(self.token_amount),
            token_value_usd: non_negative(self.token_value_usd),
            usdc_balance: non_negative(self.usdc_balance),
        }
    }
}
