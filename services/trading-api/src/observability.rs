//! Observability: metrics collection and structured logging

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::brain::TradeAction;

/// Metrics collector for tracking service health
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<RwLock<MetricsInner>>,
}

struct MetricsInner {
    counters: HashMap<String, u64>,
    gauges: HashMap<String, f64>,
    start_time: Instant,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MetricsInner {
                counters: HashMap::new(),
                gauges: HashMap::new(),
                start_time: Instant::now(),
            })),
        }
    }

    /// Increment a counter
    pub async fn increment(&self, name: &str, value: u64) {
        let mut inner = self.inner.write().await;
        let counter = inner.counters.entry(name.to_string()).or_insert(0);
        *counter += value;
    }

    /// Set a gauge value
    pub async fn gauge(&self, name: &str, value: f64) {
        let mut inner = self.inner.write().await;
        inner.gauges.insert(name.to_string(), value);
    }

    /// Count one decision under its action
    pub async fn record_decision(&self, action: TradeAction) {
        let name = match action {
            TradeAction::Buy => metrics::DECISION_BUY,
            TradeAction::Sell => metrics::DECISION_SELL,
            TradeAction::Hold => metrics::DECISION_HOLD,
        };
        self.increment(name, 1).await;
    }

    /// Get all metrics as JSON-serializable format
    pub async fn snapshot(&self) -> MetricsSnapshot {
        let inner = self.inner.read().await;
        MetricsSnapshot {
            counters: inner.counters.clone(),
            gauges: inner.gauges.clone(),
            uptime_secs: inner.start_time.elapsed().as_secs(),
        }
    }

    /// Get specific counter
    pub async fn get_counter(&self, name: &str) -> u64 {
        let inner = self.inner.read().await;
        inner.counters.get(name).copied().unwrap_or(0)
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSnapshot {
    pub counters: HashMap<String, u64>,
    pub gauges: HashMap<String, f64>,
    pub uptime_secs: u64,
}

/// Structured logger for consistent log formatting
pub struct Logger;

impl Logger {
    /// Log a decision
    pub fn decision_event(agent_id: &str, symbol: &str, action: TradeAction, confidence: f64) {
        tracing::info!(
            agent_id = %agent_id,
            symbol = %symbol,
            action = %action,
            confidence = confidence,
            "decision_event"
        );
    }

    /// Log a trade attempt and how it ended
    pub fn trade_event(agent_id: &str, symbol: &str, action: TradeAction, status: &str) {
        tracing::info!(
            agent_id = %agent_id,
            symbol = %symbol,
            action = %action,
            status = %status,
            "trade_event"
        );
    }
}

/// Predefined metric names
pub mod metrics {
    // Decisions
    pub const DECISION_BUY: &str = "decisions_buy_total";
    pub const DECISION_SELL: &str = "decisions_sell_total";
    pub const DECISION_HOLD: &str = "decisions_hold_total";
    pub const SIMULATIONS: &str = "simulations_total";

    // Trading
    pub const TRADE_EXECUTED: &str = "trade_executed_total";
    pub const TRADE_SKIPPED: &str = "trade_skipped_total";
    pub const TRADE_FAILED: &str = "trade_failed_total";

    // Upstream
    pub const MARKET_DATA_ERRORS: &str = "market_data_errors_total";
    pub const POSITION_ERRORS: &str = "position_errors_total";
    pub const MARKET_DATA_LATENCY_MS: &str = "market_data_latency_ms";

    // API
    pub const API_REQUESTS: &str = "api_requests_total";
}
