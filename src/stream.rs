use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::exchange::auth::{request_timestamp, ApiCredentials};

pub const TICKER_CHANNEL: &str = "ticker";

/// Trade-by-trade price update from the ticker channel. Prices stay as
/// the decimal strings the feed sends.
#[derive(Debug, Clone, Deserialize)]
pub struct Ticker {
    pub product_id: String,
    pub price: String,
    #[serde(default)]
    pub best_bid: Option<String>,
    #[serde(default)]
    pub best_ask: Option<String>,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

impl Ticker {
    pub fn price_f64(&self) -> Option<f64> {
        self.price.parse().ok()
    }
}

#[derive(Debug)]
pub enum FeedMessage {
    Ticker(Ticker),
    Subscriptions(Value),
    Other(Value),
}

/// Subscribe payload for the feed. With credentials the message carries
/// the signed verification fields, unlocking authenticated channels.
pub fn subscribe_message(
    products: &[String],
    channels: &[String],
    credentials: Option<&ApiCredentials>,
) -> Result<String> {
    let mut message = serde_json::Map::new();
    message.insert("type".to_string(), json!("subscribe"));
    message.insert("product_ids".to_string(), json!(products));
    message.insert("channels".to_string(), json!(channels));

    if let Some(creds) = credentials {
        let timestamp = request_timestamp();
        message.insert("signature".to_string(), json!(creds.ws_signature(&timestamp)?));
        message.insert("key".to_string(), json!(creds.key));
        message.insert("passphrase".to_string(), json!(creds.passphrase));
        message.insert("timestamp".to_string(), json!(timestamp));
    }

    Ok(Value::Object(message).to_string())
}

/// Live websocket subscription.
pub struct Feed {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Feed {
    /// Connects and subscribes in one step.
    pub async fn connect(
        ws_url: &str,
        products: &[String],
        channels: &[String],
        credentials: Option<&ApiCredentials>,
    ) -> Result<Feed> {
        let (mut socket, _) = connect_async(ws_url)
            .await
            .map_err(|e| ClientError::Stream(format!("connect to {ws_url} failed: {e}")))?;
        debug!("Connected to {}", ws_url);

        let subscribe = subscribe_message(products, channels, credentials)?;
        socket
            .send(Message::Text(subscribe))
            .await
            .map_err(|e| ClientError::Stream(format!("subscribe failed: {e}")))?;

        Ok(Feed { socket })
    }

    /// Next decoded message, or `None` once the server closes the stream.
    pub async fn next(&mut self) -> Result<Option<FeedMessage>> {
        while let Some(frame) = self.socket.next().await {
            let frame = frame.map_err(|e| ClientError::Stream(e.to_string()))?;
            match frame {
                Message::Text(text) => return Ok(Some(decode_message(&text)?)),
                Message::Close(_) => return Ok(None),
                // Control frames are answered by the library.
                _ => continue,
            }
        }
        Ok(None)
    }

    pub async fn close(&mut self) -> Result<()> {
        self.socket
            .close(None)
            .await
            .map_err(|e| ClientError::Stream(e.to_string()))
    }
}

fn decode_message(text: &str) -> Result<FeedMessage> {
    let value: Value = serde_json::from_str(text)?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match kind.as_str() {
        "ticker" => Ok(FeedMessage::Ticker(serde_json::from_value(value)?)),
        "subscriptions" => Ok(FeedMessage::Subscriptions(value)),
        "error" => {
            let reason = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unspecified error")
                .to_string();
            Err(ClientError::Stream(reason))
        }
        _ => Ok(FeedMessage::Other(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    fn products() -> Vec<String> {
        vec!["BTC-USD".to_string(), "ETH-USD".to_string()]
    }

    fn channels() -> Vec<String> {
        vec![TICKER_CHANNEL.to_string()]
    }

    #[test]
    fn anonymous_subscribe_has_no_auth_fields() {
        let raw = subscribe_message(&products(), &channels(), None).unwrap();
        let msg: Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(msg["type"], "subscribe");
        assert_eq!(msg["product_ids"][0], "BTC-USD");
        assert_eq!(msg["channels"][0], "ticker");
        assert!(msg.get("signature").is_none());
        assert!(msg.get("key").is_none());
    }

    #[test]
    fn authenticated_subscribe_signs_the_verify_path() {
        let secret = STANDARD.encode(b"0123456789abcdef0123456789abcdef");
        let creds = ApiCredentials::new("feed-key", secret, "feed-pass");

        let raw = subscribe_message(&products(), &channels(), Some(&creds)).unwrap();
        let msg: Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(msg["key"], "feed-key");
        assert_eq!(msg["passphrase"], "feed-pass");
        let timestamp = msg["timestamp"].as_str().unwrap();
        let signature = msg["signature"].as_str().unwrap();
        assert_eq!(signature, creds.ws_signature(timestamp).unwrap());
    }

    #[test]
    fn ticker_frames_decode_to_typed_updates() {
        let message = decode_message(
            r#"{"type":"ticker","product_id":"BTC-USD","price":"42000.01",
                "best_bid":"41999.9","best_ask":"42000.1","side":"buy",
                "time":"2024-01-15T12:00:00.000000Z","sequence":12345}"#,
        )
        .unwrap();

        match message {
            FeedMessage::Ticker(ticker) => {
                assert_eq!(ticker.product_id, "BTC-USD");
                assert_eq!(ticker.price_f64(), Some(42000.01));
                assert_eq!(ticker.side.as_deref(), Some("buy"));
            }
            other => panic!("expected ticker, got {other:?}"),
        }
    }

    #[test]
    fn error_frames_become_stream_errors() {
        let result = decode_message(r#"{"type":"error","message":"Failed to subscribe"}"#);
        assert!(matches!(
            result,
            Err(ClientError::Stream(reason)) if reason == "Failed to subscribe"
        ));
    }

    #[test]
    fn unknown_frames_pass_through_untyped() {
        let message = decode_message(r#"{"type":"heartbeat","sequence":1}"#).unwrap();
        assert!(matches!(message, FeedMessage::Other(_)));

        let message = decode_message(r#"{"type":"subscriptions","channels":[]}"#).unwrap();
        assert!(matches!(message, FeedMessage::Subscriptions(_)));
    }
}
