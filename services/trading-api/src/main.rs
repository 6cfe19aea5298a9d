use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};

use market_data::CoinGeckoClient;
use trading_api::{app, AppState, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Starting ClawTrader trading API...");

    let config = ServiceConfig::load()?;
    info!(
        mode = ?config.engine.mode,
        activity_probability = config.engine.activity_probability,
        min_execute_confidence = config.trading.min_execute_confidence,
        "Configuration loaded"
    );

    let market = CoinGeckoClient::new(config.market.coingecko_api_key.clone())?
        .with_base_url(&config.market.coingecko_base_url)
        .with_technicals(config.market.include_technicals)
        .with_max_retry_wait(Duration::from_secs(config.market.request_timeout_secs / 2));
    info!(
        base_url = %config.market.coingecko_base_url,
        pro = config.market.coingecko_api_key.is_some(),
        "✓ CoinGecko provider ready"
    );

    let state = Arc::new(AppState::paper(Arc::new(market), &config)?);
    info!(
        starting_usdc = config.trading.paper_starting_usdc,
        "✓ Paper ledger ready"
    );

    let router = app(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    info!("🚀 Trading API listening on port {}", config.port);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Trading API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
