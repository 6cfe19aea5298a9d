//! Service configuration
//!
//! Layers, lowest priority first: built-in defaults, an optional
//! `clawtrader.toml` (or `CLAWTRADER_CONFIG`), `CLAWTRADER__*` environment
//! variables with `__` as the nesting separator, and finally `PORT`.

use serde::{Deserialize, Serialize};

use crate::brain::EngineConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub trading: TradingConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_port() -> u16 {
    3000
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            market: MarketConfig::default(),
            trading: TradingConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

/// Market data provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketConfig {
    #[serde(default = "default_coingecko_base_url")]
    pub coingecko_base_url: String,
    /// Pro API key; free tier when absent
    #[serde(default)]
    pub coingecko_api_key: Option<String>,
    /// Upper bound on one snapshot fetch, retries included
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Fetch daily closes for RSI/MACD/MA
    #[serde(default = "default_include_technicals")]
    pub include_technicals: bool,
}

fn default_coingecko_base_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_include_technicals() -> bool {
    true
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            coingecko_base_url: default_coingecko_base_url(),
            coingecko_api_key: None,
            request_timeout_secs: default_request_timeout_secs(),
            include_technicals: default_include_technicals(),
        }
    }
}

/// Execution policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingConfig {
    /// Smart trades below this confidence are decided but not executed
    #[serde(default = "default_min_execute_confidence")]
    pub min_execute_confidence: f64,
    /// Opening USDC balance of a new paper account
    #[serde(default = "default_paper_starting_usdc")]
    pub paper_starting_usdc: f64,
}

fn default_min_execute_confidence() -> f64 {
    55.0
}

fn default_paper_starting_usdc() -> f64 {
    1000.0
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            min_execute_confidence: default_min_execute_confidence(),
            paper_starting_usdc: default_paper_starting_usdc(),
        }
    }
}

impl ServiceConfig {
    /// Load from `.env`, the optional config file and the environment
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let file = std::env::var("CLAWTRADER_CONFIG").unwrap_or_else(|_| "clawtrader".to_string());
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&file).required(false))
            .add_source(
                config::Environment::with_prefix("CLAWTRADER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut cfg: ServiceConfig = settings.try_deserialize()?;

        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            cfg.port = port;
        }

        Ok(cfg)
    }
}
