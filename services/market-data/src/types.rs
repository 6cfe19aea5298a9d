use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time market observation for one symbol.
///
/// Only `symbol`, `current_price` and `price_change_24h` are always present.
/// Everything else is optional so a partial feed still yields a usable
/// snapshot; consumers treat a missing field as a neutral contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub symbol: String,
    pub current_price: f64,
    /// Signed percentage, e.g. -3.5 for a 3.5% drop
    pub price_change_24h: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_change_7d: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_24h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_24h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_24h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macd: Option<MacdReading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moving_averages: Option<MovingAverages>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// MACD line, signal line and their difference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdReading {
    pub value: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Simple moving averages over 20, 50 and 200 periods
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingAverages {
    pub ma20: f64,
    pub ma50: f64,
    pub ma200: f64,
}

impl MarketSnapshot {
    pub fn new(symbol: impl Into<String>, current_price: f64, price_change_24h: f64) -> Self {
        Self {
            symbol: symbol.into(),
            current_price,
            price_change_24h,
            price_change_7d: None,
            high_24h: None,
            low_24h: None,
            volume_24h: None,
            rsi: None,
            macd: None,
            moving_averages: None,
            timestamp: None,
        }
    }

    pub fn with_range(mut self, low_24h: f64, high_24h: f64) -> Self {
        self.low_24h = Some(low_24h);
        self.high_24h = Some(high_24h);
        self
    }

    pub fn with_rsi(mut self, rsi: f64) -> Self {
        self.rsi = Some(rsi);
        self
    }

    pub fn with_macd(mut self, macd: MacdReading) -> Self {
        self.macd = Some(macd);
        self
    }

    pub fn with_moving_averages(mut self, moving_averages: MovingAverages) -> Self {
        self.moving_averages = Some(moving_averages);
        self
    }

    /// Daily (low, high) when both ends are present and well ordered.
    pub fn daily_range(&self) -> Option<(f64, f64)> {
        match (self.low_24h, self.high_24h) {
            (Some(low), Some(high)) if low.is_finite() && high.is_finite() && high >= low => {
                Some((low, high))
            }
            _ => None,
        }
    }

    /// Number of indicator families (RSI, MACD, moving averages) present
    pub fn indicator_families(&self) -> usize {
        [
            self.rsi.is_some(),
            self.macd.is_some(),
            self.moving_averages.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }

    /// True when at least two indicator families are available
    pub fn has_technical_panel(&self) -> bool {
        self.indicator_families() >= 2
    }
}

/// Data source health/status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceHealth {
    pub source: String,
    pub is_healthy: bool,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub success_rate: f64,
    pub avg_latency_ms: u64,
}

/// Error types for market data retrieval
#[derive(Debug, thiserror::Error)]
pub enum MarketDataError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Rate limit exceeded for {source_name}")]
    RateLimit {
        source_name: String,
        retry_after: Option<u64>,
    },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Unsupported symbol: {0}")]
    UnsupportedSymbol(String),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),
}

/// Result type for market data operations
pub type Result<T> = std::result::Result<T, MarketDataError>;

/// Anything that can produce a market snapshot for a symbol
#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Current snapshot for a symbol
    async fn snapshot(&self, symbol: &str) -> Result<MarketSnapshot>;

    /// Source health status
    async fn health(&self) -> SourceHealth;

    /// Source name
    fn name(&self) -> &str;
}
