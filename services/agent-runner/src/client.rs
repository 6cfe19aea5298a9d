//! Trading API client

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use trading_api::brain::{AgentDna, Personality, PositionState, TradingDecision};

/// Client for the trading API's smart-trade endpoint
pub struct TradingApiClient {
    client: Client,
    base_url: String,
}

/// Body of `POST /api/smart-trade`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartTradeCall {
    pub symbol: String,
    pub agent_id: String,
    pub user_address: String,
    #[serde(rename = "agentDNA")]
    pub agent_dna: AgentDna,
    pub personality: Personality,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartTradeReply {
    pub decision: TradingDecision,
    pub positions: PositionState,
    pub trade: TradeReply,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeReply {
    pub executed: bool,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub new_balance: Option<f64>,
    #[serde(default)]
    pub tokens_traded: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `{error, code}` body of a failed request
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    code: String,
}

impl TradingApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Ask the API to decide and, when warranted, trade
    pub async fn smart_trade(&self, call: &SmartTradeCall) -> anyhow::Result<SmartTradeReply> {
        let url = format!("{}/api/smart-trade", self.base_url);
        debug!(agent_id = %call.agent_id, symbol = %call.symbol, "Calling smart-trade");

        let response = self.client.post(&url).json(call).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => Err(anyhow::anyhow!(
                "smart-trade failed: {} {} - {}",
                status,
                body.code,
                body.error
            )),
            Err(_) => Err(anyhow::anyhow!("smart-trade failed: {} - {}", status, text)),
        }
    }
}
