use chrono::{DateTime, Duration, Utc};

use crate::models::{Candle, CandleSeries};

/// One candle with a flat price shape around `close`.
pub fn candle_at(timestamp: DateTime<Utc>, close: f64) -> Candle {
    Candle {
        timestamp,
        product_id: "BTC-USD".to_string(),
        low: close - 1.0,
        high: close + 1.0,
        open: close - 0.5,
        close,
        volume: 100.0,
    }
}

/// `n` one-minute candles starting at `base`, prices rising by one.
pub fn minute_series(base: DateTime<Utc>, n: usize) -> CandleSeries {
    let candles = (0..n)
        .map(|i| candle_at(base + Duration::minutes(i as i64), 100.0 + i as f64))
        .collect();
    CandleSeries::new(candles)
}

/// Candles at the given minute offsets from `base`, ascending as given.
pub fn series_at_minutes(base: DateTime<Utc>, minutes: &[i64]) -> CandleSeries {
    let candles = minutes
        .iter()
        .map(|&m| candle_at(base + Duration::minutes(m), 100.0 + m as f64))
        .collect();
    CandleSeries::new(candles)
}
