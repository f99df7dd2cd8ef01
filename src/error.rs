use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Errors surfaced by the REST client, the candle cache and the feed.
///
/// Fetch-path failures (`Transport`, `Api`, `Decode`) abort the current
/// operation without touching any persisted series; the previously saved
/// cache is always left intact.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API responded {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid bounds: start {start} is after end {end}")]
    InvalidBounds {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("granularity must be one of 60, 300, 900, 3600, 21600 or 86400 seconds, got {0}")]
    InvalidGranularity(u64),

    #[error("unrecognized timestamp `{0}`")]
    InvalidTimestamp(String),

    #[error("invalid API credentials: {0}")]
    Credentials(String),

    #[error("series store failure at {path}: {source}")]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("websocket feed: {0}")]
    Stream(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
