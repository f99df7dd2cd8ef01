use serde::{Deserialize, Serialize};

use crate::exchange::ApiCredentials;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Exchange endpoints
    pub api_url: String,
    pub ws_url: String,

    // Credentials (all empty for public-only access)
    pub api_key: String,
    pub api_secret: String,
    pub api_passphrase: String,

    // Local candle database
    pub data_dir: String,

    pub product_id: String,

    // Logging
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        Config {
            api_url: env("COINBASE_API_URL", "https://api.exchange.coinbase.com"),
            ws_url: env("COINBASE_WS_URL", "wss://ws-feed.exchange.coinbase.com"),
            api_key: env("COINBASE_API_KEY", ""),
            api_secret: env("COINBASE_API_SECRET", ""),
            api_passphrase: env("COINBASE_API_PASSPHRASE", ""),
            data_dir: env("DATA_DIR", "database"),
            product_id: env("PRODUCT_ID", "BTC-USD"),
            log_level: env("LOG_LEVEL", "INFO"),
        }
    }

    /// Credentials when the full key/secret/passphrase triple is set.
    /// Public endpoints (candles, the ticker feed) work without them.
    pub fn credentials(&self) -> Option<ApiCredentials> {
        if self.api_key.is_empty() || self.api_secret.is_empty() || self.api_passphrase.is_empty()
        {
            return None;
        }
        Some(ApiCredentials::new(
            self.api_key.clone(),
            self.api_secret.clone(),
            self.api_passphrase.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_key_material_yields_no_credentials() {
        let mut config = Config {
            api_url: String::new(),
            ws_url: String::new(),
            api_key: "key".to_string(),
            api_secret: String::new(),
            api_passphrase: "pass".to_string(),
            data_dir: String::new(),
            product_id: String::new(),
            log_level: String::new(),
        };
        assert!(config.credentials().is_none());

        config.api_secret = "c2VjcmV0".to_string();
        let creds = config.credentials().unwrap();
        assert_eq!(creds.key, "key");
        assert_eq!(creds.passphrase, "pass");
    }
}
