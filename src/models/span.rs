use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ClientError;

/// Minute-precision format for user-facing timestamps and bounds.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Inclusive `[start, end]` time interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeSpan {
    /// Build a span, rejecting inverted bounds before they can reach the
    /// network path.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<TimeSpan, ClientError> {
        if start > end {
            return Err(ClientError::InvalidBounds { start, end });
        }
        Ok(TimeSpan { start, end })
    }

    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts <= self.end
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} .. {}",
            self.start.format(DISPLAY_FORMAT),
            self.end.format(DISPLAY_FORMAT)
        )
    }
}

/// Parse a user-entered `YYYY-MM-DD HH:MM` bound. Bounds are wall-clock
/// local time; the rest of the crate works in UTC.
pub fn parse_bound(input: &str) -> Result<DateTime<Utc>, ClientError> {
    let naive = NaiveDateTime::parse_from_str(input.trim(), DISPLAY_FORMAT)
        .map_err(|_| ClientError::InvalidTimestamp(input.to_string()))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| ClientError::InvalidTimestamp(input.to_string()))
}

/// Render a timestamp in the local-time display format.
pub fn display_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format(DISPLAY_FORMAT).to_string()
}
