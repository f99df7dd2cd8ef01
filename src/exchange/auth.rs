use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{ClientError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Path signed into the feed's authenticated subscribe message.
pub const WS_VERIFY_PATH: &str = "/users/self/verify";

/// Key material for the `CB-ACCESS-*` signed-request scheme.
///
/// The secret is the base64 string handed out with the key; it is decoded
/// to raw bytes before keying the MAC.
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    pub key: String,
    pub secret: String,
    pub passphrase: String,
}

impl ApiCredentials {
    pub fn new(
        key: impl Into<String>,
        secret: impl Into<String>,
        passphrase: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
            passphrase: passphrase.into(),
        }
    }

    /// Base64 HMAC-SHA256 over `timestamp + method + request_path + body`.
    ///
    /// `request_path` must be the exact path-and-query string sent on the
    /// wire; the server recomputes the MAC from what it receives.
    pub fn signature(
        &self,
        timestamp: &str,
        method: &str,
        request_path: &str,
        body: &str,
    ) -> Result<String> {
        let secret = STANDARD
            .decode(&self.secret)
            .map_err(|e| ClientError::Credentials(format!("secret is not valid base64: {e}")))?;
        let mut mac = HmacSha256::new_from_slice(&secret)
            .map_err(|e| ClientError::Credentials(format!("unusable secret key: {e}")))?;
        mac.update(timestamp.as_bytes());
        mac.update(method.as_bytes());
        mac.update(request_path.as_bytes());
        mac.update(body.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }

    /// Header set attached to every signed REST request.
    pub fn headers(
        &self,
        timestamp: &str,
        method: &str,
        request_path: &str,
        body: &str,
    ) -> Result<Vec<(&'static str, String)>> {
        let signature = self.signature(timestamp, method, request_path, body)?;
        Ok(vec![
            ("CB-ACCESS-SIGN", signature),
            ("CB-ACCESS-TIMESTAMP", timestamp.to_string()),
            ("CB-ACCESS-KEY", self.key.clone()),
            ("CB-ACCESS-PASSPHRASE", self.passphrase.clone()),
            ("Content-Type", "Application/JSON".to_string()),
        ])
    }

    /// Signature for the feed's subscribe message, which authenticates by
    /// signing a GET of the fixed verification path.
    pub fn ws_signature(&self, timestamp: &str) -> Result<String> {
        self.signature(timestamp, "GET", WS_VERIFY_PATH, "")
    }
}

/// Epoch timestamp in the float-seconds form the scheme expects.
pub fn request_timestamp() -> String {
    let now = Utc::now();
    format!("{}.{:06}", now.timestamp(), now.timestamp_subsec_micros())
}
