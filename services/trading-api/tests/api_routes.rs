//! HTTP surface tests: the router driven in-process with stub collaborators

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use market_data::{MarketDataError, MarketDataProvider, MarketSnapshot, SourceHealth};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;
use trading_api::{
    app,
    brain::PositionState,
    execution::{ExecutorError, TradeExecutor, TradeReceipt, TradeRequest},
    observability::metrics,
    AppState, PaperLedger, PositionError, PositionProvider, ServiceConfig,
};

const OWNER: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

/// Serves one fixed snapshot, or fails when none is set
struct StubMarket {
    snapshot: Option<MarketSnapshot>,
    calls: AtomicUsize,
}

impl StubMarket {
    fn serving(snapshot: MarketSnapshot) -> Arc<Self> {
        Arc::new(Self {
            snapshot: Some(snapshot),
            calls: AtomicUsize::new(0),
        })
    }

    fn down() -> Arc<Self> {
        Arc::new(Self {
            snapshot: None,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl MarketDataProvider for StubMarket {
    async fn snapshot(&self, symbol: &str) -> market_data::Result<MarketSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.snapshot {
            Some(s) => Ok(MarketSnapshot { symbol: symbol.to_string(), ..s.clone() }),
            None => Err(MarketDataError::ApiError("HTTP 503".to_string())),
        }
    }

    async fn health(&self) -> SourceHealth {
        SourceHealth {
            source: "stub".to_string(),
            is_healthy: self.snapshot.is_some(),
            last_success: None,
            last_error: None,
            success_rate: if self.snapshot.is_some() { 1.0 } else { 0.0 },
            avg_latency_ms: 0,
        }
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Executor that cannot reach its venue
struct OfflineExecutor;

#[async_trait]
impl TradeExecutor for OfflineExecutor {
    async fn execute(&self, _request: &TradeRequest) -> Result<TradeReceipt, ExecutorError> {
        Err(ExecutorError::Unavailable("rpc timeout".to_string()))
    }

    fn name(&self) -> &str {
        "offline"
    }
}

/// Wallet indexer that is down
struct UnreachablePositions;

#[async_trait]
impl PositionProvider for UnreachablePositions {
    async fn position(
        &self,
        _owner: &str,
        _agent_id: &str,
        _symbol: &str,
        _price: f64,
    ) -> Result<PositionState, PositionError> {
        Err(PositionError::Unavailable("indexer returned 503".to_string()))
    }
}

fn oversold() -> MarketSnapshot {
    MarketSnapshot::new("BTC", 100.0, -3.0)
        .with_range(95.0, 110.0)
        .with_rsi(25.0)
}

fn paper_state(market: Arc<StubMarket>) -> Arc<AppState> {
    Arc::new(AppState::paper(market, &ServiceConfig::default()).unwrap())
}

fn smart_trade_body(symbol: &str) -> Value {
    json!({
        "symbol": symbol,
        "agentId": "agent-7",
        "userAddress": OWNER,
        "agentDNA": {
            "riskTolerance": 50,
            "aggression": 50,
            "patternRecognition": 80,
            "timingSensitivity": 20,
            "contrarianBias": 20
        }
    })
}

async fn send(router: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_smart_trade_decides_and_fills_on_paper() {
    let state = paper_state(StubMarket::serving(oversold()));

    let (status, body) = send(app(state.clone()), "POST", "/api/smart-trade", Some(smart_trade_body("btc"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["decision"]["action"], "BUY");
    assert!(body["decision"]["confidence"].as_f64().unwrap() >= 55.0);
    assert_eq!(body["marketData"]["symbol"], "BTC");
    assert_eq!(body["positions"]["hasPosition"], false);
    assert_eq!(body["positions"]["usdcBalance"], 1000.0);

    let trade = &body["trade"];
    assert_eq!(trade["executed"], true);
    assert!(trade["txHash"].as_str().unwrap().starts_with("paper-"));
    assert!(trade["newBalance"].as_f64().unwrap() < 1000.0);
    assert!(trade["tokensTraded"].as_f64().unwrap() > 0.0);
    assert!(trade.get("error").is_none());

    // The fill shows up in the next position lookup
    let (_, body) = send(app(state.clone()), "POST", "/api/smart-trade", Some(smart_trade_body("BTC"))).await;
    assert_eq!(body["positions"]["hasPosition"], true);

    let (status, metrics) = send(app(state), "GET", "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(metrics["counters"]["decisions_buy_total"], 2);
    assert_eq!(metrics["counters"]["trade_executed_total"], 2);
}

#[tokio::test]
async fn test_unsupported_symbol_rejected_before_fetch() {
    let market = StubMarket::serving(oversold());
    let state = paper_state(market.clone());

    let (status, body) = send(app(state), "POST", "/api/smart-trade", Some(smart_trade_body("DOGEMOON"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "unsupported_symbol");
    assert_eq!(market.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_invalid_address_rejected() {
    let state = paper_state(StubMarket::serving(oversold()));
    let mut body = smart_trade_body("BTC");
    body["userAddress"] = json!("0x1234");

    let (status, body) = send(app(state), "POST", "/api/smart-trade", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");
}

#[tokio::test]
async fn test_market_outage_is_502_without_decision() {
    let state = paper_state(StubMarket::down());

    let (status, body) = send(app(state.clone()), "POST", "/api/smart-trade", Some(smart_trade_body("ETH"))).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "upstream_unavailable");
    assert!(body.get("decision").is_none());
    assert_eq!(
        state.metrics.get_counter(metrics::MARKET_DATA_ERRORS).await,
        1
    );

    let (status, health) = send(app(state), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "degraded");
}

#[tokio::test]
async fn test_position_lookup_failure_is_502_without_decision() {
    let ledger = Arc::new(PaperLedger::new(Decimal::from(1000)));
    let state = Arc::new(AppState::new(
        StubMarket::serving(oversold()),
        Arc::new(UnreachablePositions),
        ledger,
        &ServiceConfig::default(),
    ));

    let (status, body) = send(app(state.clone()), "POST", "/api/smart-trade", Some(smart_trade_body("BTC"))).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "upstream_unavailable");
    assert!(body["error"].as_str().unwrap().contains("indexer returned 503"));
    assert!(body.get("decision").is_none());
    assert_eq!(state.metrics.get_counter(metrics::POSITION_ERRORS).await, 1);
    assert_eq!(state.metrics.get_counter(metrics::DECISION_BUY).await, 0);
    assert_eq!(state.metrics.get_counter(metrics::TRADE_EXECUTED).await, 0);
}

#[tokio::test]
async fn test_executor_failure_keeps_the_decision() {
    let ledger = Arc::new(PaperLedger::new(Decimal::from(1000)));
    let state = Arc::new(AppState::new(
        StubMarket::serving(oversold()),
        ledger,
        Arc::new(OfflineExecutor),
        &ServiceConfig::default(),
    ));

    let (status, body) = send(app(state), "POST", "/api/smart-trade", Some(smart_trade_body("BTC"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["decision"]["action"], "BUY");
    assert_eq!(body["trade"]["executed"], false);
    assert!(body["trade"]["txHash"].is_null());
    assert!(body["trade"]["error"].as_str().unwrap().contains("rpc timeout"));
}

#[tokio::test]
async fn test_execute_trade_force_path() {
    let state = paper_state(StubMarket::serving(oversold()));
    let order = |action: &str, amount: f64| {
        json!({
            "action": action,
            "symbol": "SOL",
            "amountUSDC": amount,
            "agentId": "agent-7",
            "userAddress": OWNER
        })
    };

    let (status, body) = send(app(state.clone()), "POST", "/api/execute-trade", Some(order("HOLD", 10.0))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");

    // Nothing held yet
    let (status, body) = send(app(state.clone()), "POST", "/api/execute-trade", Some(order("SELL", 10.0))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "trade_refused");

    let (status, body) = send(app(state.clone()), "POST", "/api/execute-trade", Some(order("BUY", 100.0))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action"], "BUY");
    assert_eq!(body["trade"]["newBalance"], 900.0);
    assert_eq!(body["trade"]["tokensTraded"], 1.0);

    let (status, _) = send(app(state.clone()), "POST", "/api/execute-trade", Some(order("sell", 50.0))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(app(state), "POST", "/api/execute-trade", Some(order("BUY", 5000.0))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_simulate_is_reproducible_with_seed() {
    let state = paper_state(StubMarket::down());
    let body = json!({
        "agentDNA": { "timingSensitivity": 30 },
        "market": {
            "symbol": "BTC",
            "currentPrice": 100.0,
            "priceChange24h": 0.5,
            "high24h": 104.0,
            "low24h": 97.0
        },
        "personality": "chaotic",
        "seed": 1234
    });

    let (status, first) = send(app(state.clone()), "POST", "/api/simulate-decision", Some(body.clone())).await;
    let (_, second) = send(app(state.clone()), "POST", "/api/simulate-decision", Some(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
    assert_eq!(first["trace"]["mode"], "basic");
    assert_eq!(first["trace"]["personality"]["personality"], "chaotic");
    assert!(first["decision"]["action"].is_string());

    // Dry runs never touch the ledger or the market provider
    assert_eq!(state.metrics.get_counter("trade_executed_total").await, 0);
    assert_eq!(state.metrics.get_counter("simulations_total").await, 2);
}

#[tokio::test]
async fn test_symbols_and_liveness() {
    let state = paper_state(StubMarket::serving(oversold()));

    let (status, body) = send(app(state.clone()), "GET", "/api/symbols", None).await;
    assert_eq!(status, StatusCode::OK);
    let symbols: Vec<&str> = body["symbols"].as_array().unwrap().iter().filter_map(|s| s.as_str()).collect();
    assert!(symbols.contains(&"BTC") && symbols.contains(&"SOL"));

    let (status, _) = send(app(state), "GET", "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
}
