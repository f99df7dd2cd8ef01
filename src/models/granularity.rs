use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ClientError;

/// Candle bucket size. The backend accepts exactly these six values, so any
/// other number of seconds is rejected at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "6h")]
    H6,
    #[serde(rename = "1d")]
    D1,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::M1 => "1m",
            Granularity::M5 => "5m",
            Granularity::M15 => "15m",
            Granularity::H1 => "1h",
            Granularity::H6 => "6h",
            Granularity::D1 => "1d",
        }
    }

    pub fn as_secs(&self) -> u64 {
        match self {
            Granularity::M1 => 60,
            Granularity::M5 => 300,
            Granularity::M15 => 900,
            Granularity::H1 => 3600,
            Granularity::H6 => 21600,
            Granularity::D1 => 86400,
        }
    }

    pub fn as_minutes(&self) -> i64 {
        self.as_secs() as i64 / 60
    }

    /// One bucket width, i.e. the distance between adjacent candle labels.
    pub fn step(&self) -> Duration {
        Duration::seconds(self.as_secs() as i64)
    }

    pub fn from_secs(secs: u64) -> Result<Granularity, ClientError> {
        match secs {
            60 => Ok(Granularity::M1),
            300 => Ok(Granularity::M5),
            900 => Ok(Granularity::M15),
            3600 => Ok(Granularity::H1),
            21600 => Ok(Granularity::H6),
            86400 => Ok(Granularity::D1),
            other => Err(ClientError::InvalidGranularity(other)),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<u64> for Granularity {
    type Error = ClientError;

    fn try_from(secs: u64) -> Result<Granularity, ClientError> {
        Granularity::from_secs(secs)
    }
}
