//! Market data for ClawTrader agents
//!
//! Shared snapshot types, indicator math and the CoinGecko provider.

pub mod indicators;
pub mod symbols;
pub mod types;
pub mod sources {
    pub mod coingecko;
}

pub use indicators::TechnicalPanel;
pub use sources::coingecko::CoinGeckoClient;
pub use types::*;
