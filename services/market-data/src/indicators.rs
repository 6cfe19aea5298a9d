//! Indicator math over closing prices
//!
//! Closes are ordered oldest first. Every function returns `None` when the
//! history is too short instead of guessing.

use crate::types::{MacdReading, MarketSnapshot, MovingAverages};

pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

/// Simple moving average of the last `period` values
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let sum: f64 = values.iter().rev().take(period).sum();
    Some(sum / period as f64)
}

/// EMA series seeded with the SMA of the first `period` values.
///
/// Element `i` of the output lines up with `values[i + period - 1]`.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;

    let mut series = Vec::with_capacity(values.len() - period + 1);
    series.push(seed);
    let mut ema = seed;
    for value in &values[period..] {
        ema = (value - ema) * multiplier + ema;
        series.push(ema);
    }
    series
}

/// Latest EMA value
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    ema_series(values, period).last().copied()
}

/// Relative Strength Index with Wilder smoothing.
///
/// The first `period` changes seed simple averages of gains and losses; each
/// later change is folded in as `(avg * (period - 1) + x) / period`. A flat
/// history reads as neutral 50.
pub fn rsi(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period + 1 {
        return None;
    }

    let split = |change: f64| {
        if change > 0.0 {
            (change, 0.0)
        } else {
            (0.0, change.abs())
        }
    };
    let changes: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    let n = period as f64;

    let (mut avg_gain, mut avg_loss) = changes[..period]
        .iter()
        .map(|c| split(*c))
        .fold((0.0, 0.0), |(g, l), (cg, cl)| (g + cg, l + cl));
    avg_gain /= n;
    avg_loss /= n;

    for change in &changes[period..] {
        let (gain, loss) = split(*change);
        avg_gain = (avg_gain * (n - 1.0) + gain) / n;
        avg_loss = (avg_loss * (n - 1.0) + loss) / n;
    }

    if avg_gain == 0.0 && avg_loss == 0.0 {
        return Some(50.0);
    }
    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}

/// MACD with the given fast/slow/signal periods
pub fn macd(values: &[f64], fast: usize, slow: usize, signal: usize) -> Option<MacdReading> {
    if fast == 0 || fast >= slow {
        return None;
    }

    let fast_series = ema_series(values, fast);
    let slow_series = ema_series(values, slow);
    if slow_series.is_empty() {
        return None;
    }

    // fast_series starts (slow - fast) values earlier than slow_series
    let offset = slow - fast;
    let macd_line: Vec<f64> = slow_series
        .iter()
        .enumerate()
        .map(|(i, slow_ema)| fast_series[i + offset] - slow_ema)
        .collect();

    let signal_series = ema_series(&macd_line, signal);
    let value = *macd_line.last()?;
    let signal_value = *signal_series.last()?;

    Some(MacdReading {
        value,
        signal: signal_value,
        histogram: value - signal_value,
    })
}

/// 20/50/200 simple moving averages, all or nothing
pub fn moving_averages(values: &[f64]) -> Option<MovingAverages> {
    Some(MovingAverages {
        ma20: sma(values, 20)?,
        ma50: sma(values, 50)?,
        ma200: sma(values, 200)?,
    })
}

/// Technical indicators derived from one close history
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TechnicalPanel {
    pub rsi: Option<f64>,
    pub macd: Option<MacdReading>,
    pub moving_averages: Option<MovingAverages>,
}

impl TechnicalPanel {
    pub fn from_closes(closes: &[f64]) -> Self {
        Self {
            rsi: rsi(closes, RSI_PERIOD),
            macd: macd(closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL),
            moving_averages: moving_averages(closes),
        }
    }

    /// Copy the available indicators onto a snapshot, leaving the rest untouched
    pub fn apply(self, mut snapshot: MarketSnapshot) -> MarketSnapshot {
        if self.rsi.is_some() {
            snapshot.rsi = self.rsi;
        }
        if self.macd.is_some() {
            snapshot.macd = self.macd;
        }
        if self.moving_averages.is_some() {
            snapshot.moving_averages = self.moving_averages;
        }
        snapshot
    }
}
