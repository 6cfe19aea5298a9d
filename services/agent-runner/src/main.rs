//! Agent Runner - autonomous trading loop for a roster of agents
//!
//! 1. Loads the agent roster (YAML)
//! 2. Every tick, calls the trading API's smart-trade for each agent/symbol
//! 3. Skips pairs still inside their cooldown window
//! 4. Stops on Ctrl-C

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use agent_runner::{AgentRunner, RosterConfig, TradingApiClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    dotenvy::dotenv().ok();

    info!("Starting Agent Runner...");

    let path = RosterConfig::path_from_env();
    let roster = RosterConfig::load(&path)?;
    info!(
        "Roster {} loaded: {} agents, trading API {}",
        path,
        roster.agents.len(),
        roster.api_url
    );

    let client = Arc::new(TradingApiClient::new(
        &roster.api_url,
        Duration::from_secs(roster.request_timeout_secs),
    )?);

    let runner = AgentRunner::new(client, roster);
    runner.run().await
}
