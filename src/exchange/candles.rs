use chrono::{DateTime, Duration, Utc};
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::exchange::pagination::fetch_all_pages;
use crate::exchange::transport::Transport;
use crate::models::{Candle, Granularity, TimeSpan};

/// Most candles the backend hands back per request.
pub const MAX_POINTS_PER_REQUEST: i32 = 300;

/// Widest span one request may cover: a full page of buckets spans
/// `MAX_POINTS_PER_REQUEST - 1` steps between its first and last label.
pub fn max_request_window(granularity: Granularity) -> Duration {
    granularity.step() * (MAX_POINTS_PER_REQUEST - 1)
}

/// Splits `span` into per-request bounds that respect the point cap.
///
/// Every chunk except the last starts one step before its share of the
/// span, so adjacent batches overlap on a shared bucket and no label can
/// fall through a seam; the final chunk carries the exact remaining
/// bounds. Seam duplicates are removed when the batches are merged.
pub fn plan_chunks(granularity: Granularity, span: TimeSpan) -> Vec<TimeSpan> {
    let step = granularity.step();
    let window = max_request_window(granularity);

    let mut chunks = Vec::new();
    let mut cursor = span.start;
    while cursor <= span.end {
        if span.end - cursor <= window {
            chunks.push(TimeSpan {
                start: cursor,
                end: span.end,
            });
            break;
        }
        chunks.push(TimeSpan {
            start: cursor - step,
            end: cursor + window,
        });
        cursor += window + step;
    }
    chunks
}

/// Raw candle record: `[epoch_seconds, low, high, open, close, volume]`.
#[derive(Debug, Deserialize)]
struct RawCandle(i64, f64, f64, f64, f64, f64);

impl RawCandle {
    fn into_candle(self, product_id: &str) -> Result<Candle> {
        let timestamp = DateTime::from_timestamp(self.0, 0)
            .ok_or_else(|| ClientError::InvalidTimestamp(self.0.to_string()))?;
        Ok(Candle {
            timestamp,
            product_id: product_id.to_string(),
            low: self.1,
            high: self.2,
            open: self.3,
            close: self.4,
            volume: self.5,
        })
    }
}

/// Fetches every candle the backend holds for `span`, batching requests
/// under the point cap.
///
/// The merged result is ascending, holds one candle per label, and is
/// trimmed back to `span` (the chunk widening fetches one extra bucket
/// before the span that callers never asked for).
pub async fn fill_span(
    transport: &dyn Transport,
    product_id: &str,
    granularity: Granularity,
    span: TimeSpan,
) -> Result<Vec<Candle>> {
    let chunks = plan_chunks(granularity, span);
    debug!(
        "Pulling {} {} candles in {} request(s) for {}",
        product_id,
        granularity,
        chunks.len(),
        span
    );

    let mut candles: Vec<Candle> = Vec::new();
    for chunk in chunks {
        candles.extend(request_candles(transport, product_id, granularity, chunk).await?);
    }

    candles.sort_by_key(|c| c.timestamp);
    candles.dedup_by_key(|c| c.timestamp);
    candles.retain(|c| span.contains(c.timestamp));
    Ok(candles)
}

async fn request_candles(
    transport: &dyn Transport,
    product_id: &str,
    granularity: Granularity,
    chunk: TimeSpan,
) -> Result<Vec<Candle>> {
    let path = format!("/products/{product_id}/candles");
    let query = vec![
        ("granularity".to_string(), granularity.as_secs().to_string()),
        ("start".to_string(), wire_time(chunk.start)),
        ("end".to_string(), wire_time(chunk.end)),
    ];

    let records = fetch_all_pages(transport, Method::GET, &path, &query).await?;
    let mut candles = Vec::with_capacity(records.len());
    for record in records {
        let raw: RawCandle = serde_json::from_value(record)?;
        candles.push(raw.into_candle(product_id)?);
    }
    Ok(candles)
}

/// ISO-8601 with a `Z` suffix, which stays URL-safe in query strings.
fn wire_time(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
