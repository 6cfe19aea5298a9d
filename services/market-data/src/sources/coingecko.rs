use crate::indicators::TechnicalPanel;
use crate::symbols;
use crate::types::*;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Days of daily closes requested for indicators (covers MA200 plus slack)
const CHART_DAYS: u32 = 210;

/// Internal health tracking for API-free health checks
struct HealthTracker {
    /// Timestamp of last successful request (millis since epoch)
    last_success_ms: AtomicU64,
    /// Timestamp of last failed request (millis since epoch)
    last_failure_ms: AtomicU64,
    success_count: AtomicU64,
    failure_count: AtomicU64,
    /// Last known latency in ms
    last_latency_ms: AtomicU64,
}

impl HealthTracker {
    fn new() -> Self {
        Self {
            last_success_ms: AtomicU64::new(0),
            last_failure_ms: AtomicU64::new(0),
            success_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
            last_latency_ms: AtomicU64::new(0),
        }
    }

    fn record_success(&self, latency_ms: u64) {
        let now_ms = Utc::now().timestamp_millis() as u64;
        self.last_success_ms.store(now_ms, Ordering::Relaxed);
        self.last_latency_ms.store(latency_ms, Ordering::Relaxed);
        self.success_count.fetch_add(1, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        let now_ms = Utc::now().timestamp_millis() as u64;
        self.last_failure_ms.store(now_ms, Ordering::Relaxed);
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    fn is_healthy(&self) -> bool {
        let last_success = self.last_success_ms.load(Ordering::Relaxed);
        let last_failure = self.last_failure_ms.load(Ordering::Relaxed);

        // Healthy if: had at least one success AND (no failures OR last success >= last failure)
        last_success > 0 && (last_failure == 0 || last_success >= last_failure)
    }

    fn success_rate(&self) -> f64 {
        let successes = self.success_count.load(Ordering::Relaxed);
        let failures = self.failure_count.load(Ordering::Relaxed);
        let total = successes + failures;
        if total == 0 {
            return 1.0;
        }
        successes as f64 / total as f64
    }
}

/// CoinGecko market data provider
///
/// One `/coins/markets` call gives price, 24h/7d change, range and volume.
/// When technicals are enabled a second `/coins/{id}/market_chart` call
/// supplies daily closes for RSI, MACD and moving averages; if that call
/// fails the snapshot is returned without them.
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    include_technicals: bool,
    max_retry_wait: Duration,
    rate_limiter: tokio::sync::Semaphore,
    last_request: tokio::sync::Mutex<Instant>,
    health_tracker: HealthTracker,
}

impl CoinGeckoClient {
    /// Per-request timeout
    const REQUEST_TIMEOUT_SECS: u64 = 10;

    /// Free tier: ~10-30 calls/minute
    /// Pro tier: higher limits with API key
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| MarketDataError::ApiError(e.to_string()))?;

        // Free tier: allow 1 concurrent request to stay under rate limit
        let permits = if api_key.is_some() { 5 } else { 1 };

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            include_technicals: true,
            max_retry_wait: Duration::from_secs(120),
            rate_limiter: tokio::sync::Semaphore::new(permits),
            last_request: tokio::sync::Mutex::new(Instant::now() - Duration::from_secs(10)),
            health_tracker: HealthTracker::new(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_technicals(mut self, include_technicals: bool) -> Self {
        self.include_technicals = include_technicals;
        self
    }

    /// Upper bound on the wait before retrying a 429
    pub fn with_max_retry_wait(mut self, max_retry_wait: Duration) -> Self {
        self.max_retry_wait = max_retry_wait;
        self
    }

    /// Build request with optional API key
    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut req = self.client.get(&url);

        if let Some(key) = &self.api_key {
            req = req.header("x-cg-pro-api-key", key);
        }

        req
    }

    /// Rate-limited request wrapper with per-request timeout and retry on 429
    async fn rate_limited_request<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<T> {
        let request_start = Instant::now();

        // Initial attempt + 1 retry on rate limit
        for attempt in 0..2 {
            let _permit = self.rate_limiter.acquire().await.map_err(|e| {
                self.health_tracker.record_failure();
                MarketDataError::ApiError(e.to_string())
            })?;

            // Minimum delay between requests (free tier friendly)
            {
                let mut last = self.last_request.lock().await;
                let elapsed = last.elapsed();
                if elapsed < Duration::from_millis(100) {
                    tokio::time::sleep(Duration::from_millis(100) - elapsed).await;
                }
                *last = Instant::now();
            }

            let request_future = self.build_request(endpoint).send();
            let response = match tokio::time::timeout(
                Duration::from_secs(Self::REQUEST_TIMEOUT_SECS),
                request_future,
            )
            .await
            {
                Ok(Ok(resp)) => resp,
                Ok(Err(e)) => {
                    self.health_tracker.record_failure();
                    return Err(MarketDataError::ApiError(e.to_string()));
                }
                Err(_) => {
                    self.health_tracker.record_failure();
                    return Err(MarketDataError::ApiError(format!(
                        "CoinGecko request to {} timed out after {}s",
                        endpoint,
                        Self::REQUEST_TIMEOUT_SECS
                    )));
                }
            };

            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok());

                if attempt == 0 {
                    let wait = Duration::from_secs(retry_after.unwrap_or(60)).min(self.max_retry_wait);
                    warn!(
                        "CoinGecko rate limited, waiting {}ms before retry",
                        wait.as_millis()
                    );
                    tokio::time::sleep(wait).await;
                    continue;
                }

                self.health_tracker.record_failure();
                return Err(MarketDataError::RateLimit {
                    source_name: "coingecko".to_string(),
                    retry_after,
                });
            }

            if !status.is_success() {
                self.health_tracker.record_failure();
                let text = response.text().await.unwrap_or_default();
                return Err(MarketDataError::ApiError(format!(
                    "CoinGecko API error ({}): {}",
                    status, text
                )));
            }

            let latency_ms = request_start.elapsed().as_millis() as u64;
            self.health_tracker.record_success(latency_ms);

            return response.json::<T>().await.map_err(|e| {
                self.health_tracker.record_failure();
                MarketDataError::InvalidResponse(e.to_string())
            });
        }

        Err(MarketDataError::ApiError(
            "Unexpected retry loop exit".to_string(),
        ))
    }

    /// Current snapshot for a supported symbol
    pub async fn snapshot(&self, symbol: &str) -> Result<MarketSnapshot> {
        let symbol = symbols::normalize(symbol);
        let coin_id = symbols::coingecko_id(&symbol)
            .ok_or_else(|| MarketDataError::UnsupportedSymbol(symbol.clone()))?;

        let endpoint = format!(
            "/coins/markets?vs_currency=usd&ids={}&price_change_percentage=24h,7d",
            coin_id
        );
        let rows: Vec<CoinMarket> = self.rate_limited_request(&endpoint).await?;
        let row = rows
            .into_iter()
            .find(|r| r.id == coin_id)
            .ok_or_else(|| MarketDataError::AssetNotFound(symbol.clone()))?;

        let current_price = row
            .current_price
            .filter(|p| p.is_finite() && *p > 0.0)
            .ok_or_else(|| {
                MarketDataError::InvalidResponse(format!("Missing current_price for {}", coin_id))
            })?;

        let snapshot = MarketSnapshot {
            symbol: symbol.clone(),
            current_price,
            price_change_24h: row.price_change_percentage_24h.unwrap_or(0.0),
            price_change_7d: row.price_change_percentage_7d_in_currency,
            high_24h: row.high_24h,
            low_24h: row.low_24h,
            volume_24h: row.total_volume,
            rsi: None,
            macd: None,
            moving_averages: None,
            timestamp: Some(row.last_updated.unwrap_or_else(Utc::now)),
        };

        if !self.include_technicals {
            return Ok(snapshot);
        }

        match self.daily_closes(coin_id).await {
            Ok(closes) => {
                debug!("{}: {} daily closes for indicators", symbol, closes.len());
                Ok(TechnicalPanel::from_closes(&closes).apply(snapshot))
            }
            Err(e) => {
                warn!("{}: technicals unavailable ({}), using coarse snapshot", symbol, e);
                Ok(snapshot)
            }
        }
    }

    /// Daily closing prices, oldest first
    async fn daily_closes(&self, coin_id: &str) -> Result<Vec<f64>> {
        let endpoint = format!(
            "/coins/{}/market_chart?vs_currency=usd&days={}&interval=daily",
            coin_id, CHART_DAYS
        );
        let chart: MarketChart = self.rate_limited_request(&endpoint).await?;
        Ok(chart
            .prices
            .into_iter()
            .map(|[_, price]| price)
            .filter(|p| p.is_finite())
            .collect())
    }

    /// Health from internal metrics (no API call)
    pub async fn health(&self) -> SourceHealth {
        let last_success_ms = self.health_tracker.last_success_ms.load(Ordering::Relaxed);
        let last_success = if last_success_ms > 0 {
            DateTime::from_timestamp_millis(last_success_ms as i64)
        } else {
            None
        };

        let is_healthy = self.health_tracker.is_healthy();
        let latency = self.health_tracker.last_latency_ms.load(Ordering::Relaxed);

        SourceHealth {
            source: "coingecko".to_string(),
            is_healthy,
            last_success,
            last_error: if is_healthy {
                None
            } else {
                Some("Recent failures detected".to_string())
            },
            success_rate: self.health_tracker.success_rate(),
            avg_latency_ms: latency,
        }
    }
}

// Response types for CoinGecko API
#[derive(Debug, serde::Deserialize)]
struct CoinMarket {
    id: String,
    current_price: Option<f64>,
    high_24h: Option<f64>,
    low_24h: Option<f64>,
    total_volume: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    price_change_percentage_7d_in_currency: Option<f64>,
    last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, serde::Deserialize)]
struct MarketChart {
    /// [[timestamp_ms, price], ...]
    prices: Vec<[f64; 2]>,
}

#[async_trait::async_trait]
impl MarketDataProvider for CoinGeckoClient {
    async fn snapshot(&self, symbol: &str) -> Result<MarketSnapshot> {
        CoinGeckoClient::snapshot(self, symbol).await
    }

    async fn health(&self) -> SourceHealth {
        CoinGeckoClient::health(self).await
    }

    fn name(&self) -> &str {
        "coingecko"
    }
}
