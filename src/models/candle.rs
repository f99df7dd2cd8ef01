use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::span::{display_time, TimeSpan};

/// One time bucket of market data for one product.
///
/// `timestamp` is the bucket label and the unique key within a
/// `(product_id, granularity)` series; field order follows the backend's
/// `[time, low, high, open, close, volume]` record layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub product_id: String,
    pub low: f64,
    pub high: f64,
    pub open: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Minute-precision local-time rendering of the bucket label.
    pub fn display_time(&self) -> String {
        display_time(self.timestamp)
    }
}

/// Ordered candle sequence for a single `(product_id, granularity)` pair.
///
/// Ascending by timestamp with unique labels once `sort_dedup` has run.
/// Serializes as a bare candle array so store files stay inspectable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(candles: Vec<Candle>) -> Self {
        Self { candles }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    pub fn first(&self) -> Option<&Candle> {
        self.candles.first()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.candles.first().map(|c| c.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.candles.last().map(|c| c.timestamp)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candle> {
        self.candles.iter()
    }

    pub fn as_slice(&self) -> &[Candle] {
        &self.candles
    }

    pub fn push(&mut self, candle: Candle) {
        self.candles.push(candle);
    }

    pub fn extend<I: IntoIterator<Item = Candle>>(&mut self, candles: I) {
        self.candles.extend(candles);
    }

    /// Restore the series invariant after a merge: ascending timestamps,
    /// one candle per label. The sort is stable, so on a duplicate label
    /// the earlier-appended candle wins.
    pub fn sort_dedup(&mut self) {
        self.candles.sort_by_key(|c| c.timestamp);
        self.candles.dedup_by_key(|c| c.timestamp);
    }

    /// Subsequence with `span.start <= timestamp <= span.end`.
    pub fn trim(&self, span: TimeSpan) -> CandleSeries {
        let candles = self
            .candles
            .iter()
            .filter(|c| span.contains(c.timestamp))
            .cloned()
            .collect();
        CandleSeries::new(candles)
    }
}

impl std::ops::Index<usize> for CandleSeries {
    type Output = Candle;
    fn index(&self, index: usize) -> &Self::Output {
        &self.candles[index]
    }
}

impl IntoIterator for CandleSeries {
    type Item = Candle;
    type IntoIter = std::vec::IntoIter<Candle>;
    fn into_iter(self) -> Self::IntoIter {
        self.candles.into_iter()
    }
}

impl<'a> IntoIterator for &'a CandleSeries {
    type Item = &'a Candle;
    type IntoIter = std::slice::Iter<'a, Candle>;
    fn into_iter(self) -> Self::IntoIter {
        self.candles.iter()
    }
}
