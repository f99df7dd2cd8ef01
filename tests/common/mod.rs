use chrono::{DateTime, Duration, Utc};
use std::path::PathBuf;

use candela::models::{Candle, CandleSeries};

/// Shared bucket origin for integration fixtures.
pub fn base_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-15T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// One flat BTC-USD candle labelled `timestamp`.
pub fn make_candle(timestamp: DateTime<Utc>, close: f64) -> Candle {
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

/// Candles at the given minute offsets from `base_time()`.
pub fn make_series_at(minutes: &[i64]) -> CandleSeries {
    let base = base_time();
    let candles: Vec<Candle> = minutes
        .iter()
        .map(|&m| make_candle(base + Duration::minutes(m), 100.0 + m as f64))
        .collect();
    CandleSeries::new(candles)
}

/// Per-test store directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("candela-integ-{}-{}", name, std::process::id()))
}
