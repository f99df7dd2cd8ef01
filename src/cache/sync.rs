use chrono::{DateTime, Timelike, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::gaps::missing_spans;
use crate::cache::store::SeriesStore;
use crate::error::Result;
use crate::exchange::candles::{fill_span, max_request_window};
use crate::exchange::transport::Transport;
use crate::models::{CandleSeries, Granularity, TimeSpan};

/// Fills absent request bounds: a missing end becomes the current minute,
/// a missing start backs one full request window off the end.
pub fn augment_bounds(
    granularity: Granularity,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<TimeSpan> {
    augment_bounds_at(Utc::now(), granularity, start, end)
}

/// `augment_bounds` with an injected clock.
pub fn augment_bounds_at(
    now: DateTime<Utc>,
    granularity: Granularity,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<TimeSpan> {
    let end = end.unwrap_or_else(|| truncate_to_minute(now));
    let start = start.unwrap_or_else(|| end - max_request_window(granularity));
    TimeSpan::new(start, end)
}

fn truncate_to_minute(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}

/// Gap-aware cached access to historical candles.
///
/// Reads come from the local store; only spans the store cannot cover
/// are fetched, and a query repairs holes anywhere in its stored series,
/// not just inside the requested bounds. Fetched candles are folded into
/// the stored series before the requested view is returned, so every
/// pull narrows future ones.
pub struct CandleCache {
    transport: Arc<dyn Transport>,
    store: Box<dyn SeriesStore>,
}

impl CandleCache {
    pub fn new(transport: Arc<dyn Transport>, store: Box<dyn SeriesStore>) -> Self {
        Self { transport, store }
    }

    /// Candles for `product_id` covering the request bounds, augmented
    /// when either is absent.
    pub async fn get_candles(
        &self,
        product_id: &str,
        granularity: Granularity,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<CandleSeries> {
        let span = augment_bounds(granularity, start, end)?;
        self.get_candles_in(product_id, granularity, span).await
    }

    /// Same as `get_candles` with the bounds already resolved.
    pub async fn get_candles_in(
        &self,
        product_id: &str,
        granularity: Granularity,
        span: TimeSpan,
    ) -> Result<CandleSeries> {
        let mut series = match self.store.load(product_id, granularity) {
            Ok(series) => series,
            Err(e) => {
                warn!("Ignoring unreadable candle cache ({}); refetching", e);
                CandleSeries::default()
            }
        };

        let gaps = missing_spans(&series, granularity, span);
        if gaps.is_empty() {
            info!(
                "Serving {} {} candles for {} from cache",
                product_id, granularity, span
            );
            return Ok(series.trim(span));
        }

        info!(
            "Cache is missing {} span(s) of {} {} data",
            gaps.len(),
            product_id,
            granularity
        );
        for gap in gaps {
            info!("  Pulling {}", gap);
            let fetched = fill_span(self.transport.as_ref(), product_id, granularity, gap).await?;
            series.extend(fetched);
        }

        // Persist the whole merged series only after every pull landed;
        // an abort mid-way leaves the previous file as it was.
        series.sort_dedup();
        self.store.save(product_id, granularity, &series)?;

        Ok(series.trim(span))
    }
}
