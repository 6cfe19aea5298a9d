pub mod brain;
pub mod config;
pub mod error;
pub mod execution;
pub mod handlers {
    pub mod simulate;
    pub mod trade;
}
pub mod health;
pub mod observability;
pub mod paper;
pub mod positions;

use std::sync::Arc;
use std::time::Duration;
use axum::{
    routing::{get, post},
    Router,
};
use market_data::MarketDataProvider;
use rust_decimal::Decimal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use brain::{decide, BrainEngine, TradeAction, TradingDecision};
pub use crate::config::{ServiceConfig, TradingConfig};
pub use error::ApiError;
pub use execution::{ExecutorError, TradeExecutor};
pub use observability::{Logger, MetricsCollector};
pub use paper::PaperLedger;
pub use positions::{PositionError, PositionProvider};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub market: Arc<dyn MarketDataProvider>,
    pub positions: Arc<dyn PositionProvider>,
    pub executor: Arc<dyn TradeExecutor>,
    pub engine: BrainEngine,
    pub trading: TradingConfig,
    /// Deadline for one market snapshot fetch
    pub market_timeout: Duration,
    pub metrics: MetricsCollector,
}

impl AppState {
    pub fn new(
        market: Arc<dyn MarketDataProvider>,
        positions: Arc<dyn PositionProvider>,
        executor: Arc<dyn TradeExecutor>,
        config: &ServiceConfig,
    ) -> Self {
        Self {
            market,
            positions,
            executor,
            engine: BrainEngine::new(config.engine.clone()),
            trading: config.trading.clone(),
            market_timeout: Duration::from_secs(config.market.request_timeout_secs.max(1)),
            metrics: MetricsCollector::new(),
        }
    }

    /// State backed by one paper ledger serving positions and fills
    pub fn paper(market: Arc<dyn MarketDataProvider>, config: &ServiceConfig) -> anyhow::Result<Self> {
        let starting_usdc = Decimal::try_from(config.trading.paper_starting_usdc)
            .map_err(|e| anyhow::anyhow!("Invalid paper_starting_usdc: {}", e))?;
        let ledger = Arc::new(PaperLedger::new(starting_usdc));
        Ok(Self::new(market, ledger.clone(), ledger, config))
    }
}

/// Build the API router
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/smart-trade", post(handlers::trade::smart_trade))
        .route("/execute-trade", post(handlers::trade::execute_trade))
        .route("/simulate-decision", post(handlers::simulate::simulate_decision))
        .route("/symbols", get(handlers::trade::list_symbols));

    Router::new()
        .nest("/api", api_routes)
        .route("/healthz", get(health::healthz))
        .route("/health", get(health::health_detail))
        .route("/metrics", get(health::metrics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
