//! Signal extraction - raw market snapshot to normalized signals

use market_data::MarketSnapshot;
use serde::Serialize;

/// Normalized view of one market snapshot.
///
/// Directional signals are in [-1, 1] (positive is bullish); `volatility` and
/// `price_position` are in [0, 1]. Absent inputs contribute 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSignals {
    pub trend: f64,
    pub momentum: f64,
    /// Daily range relative to price
    pub volatility: f64,
    pub rsi_signal: f64,
    pub macd_signal: f64,
    pub ma_signal: f64,
    /// 0 at the daily low, 1 at the daily high
    pub price_position: f64,
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

impl MarketSignals {
    pub fn extract(market: &MarketSnapshot) -> Self {
        let price = finite_or_zero(market.current_price);
        let change = finite_or_zero(market.price_change_24h);

        let (volatility, price_position) = match market.daily_range() {
            Some((low, high)) if high > low => {
                let range = high - low;
                let volatility = if price > 0.0 {
                    (range / price).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                (volatility, ((price - low) / range).clamp(0.0, 1.0))
            }
            _ => (0.0, 0.5),
        };

        Self {
            trend: (change / 10.0).clamp(-1.0, 1.0),
            momentum: (change / 5.0).clamp(-1.0, 1.0),
            volatility,
            rsi_signal: market.rsi.map(rsi_signal).unwrap_or(0.0),
            macd_signal: market
                .macd
                .map(|m| {
                    let value = finite_or_zero(m.value);
                    finite_or_zero(m.histogram / value.abs().max(1.0)).clamp(-1.0, 1.0)
                })
                .unwrap_or(0.0),
            ma_signal: market
                .moving_averages
                .map(|ma| {
                    let above = [ma.ma20, ma.ma50, ma.ma200]
                        .iter()
                        .filter(|level| price > **level)
                        .count();
                    (above as f64 / 3.0) * 2.0 - 1.0
                })
                .unwrap_or(0.0),
            price_position,
        }
    }
}

/// RSI to a directional signal.
///
/// Below 30 rises linearly from +0.3 to +1 at RSI 0; above 70 falls from -0.3
/// to -1 at RSI 100; in between a gentle slope through 0 at 50 reaching
/// +/-0.3 at the band edges, so the mapping is continuous.
pub fn rsi_signal(rsi: f64) -> f64 {
    if !rsi.is_finite() {
        return 0.0;
    }
    let rsi = rsi.clamp(0.0, 100.0);
    if rsi < 30.0 {
        0.3 + 0.7 * (30.0 - rsi) / 30.0
    } else if rsi > 70.0 {
        -(0.3 + 0.7 * (rsi - 70.0) / 30.0)
    } else {
        (50.0 - rsi) / 20.0 * 0.3
    }
}
