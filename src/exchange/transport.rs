use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::exchange::auth::{request_timestamp, ApiCredentials};

/// Response header naming the cursor for the next page, when one exists.
pub const CURSOR_HEADER: &str = "cb-after";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Decoded response body plus the pagination cursor the backend attached.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub cursor: Option<String>,
    pub body: Value,
}

/// One HTTP round trip to the exchange. Everything above this trait works
/// the same against the live API or a scripted stand-in.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
    ) -> Result<ApiResponse>;
}

/// Live transport over reqwest, signing requests when credentials are set.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    credentials: Option<ApiCredentials>,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, credentials: Option<ApiCredentials>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            credentials,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
    ) -> Result<ApiResponse> {
        // The query string is appended by hand so the signed path is
        // byte-identical to what goes on the wire.
        let path_and_query = path_with_query(path, query);
        let url = format!("{}{}", self.base_url, path_and_query);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .timeout(REQUEST_TIMEOUT);

        if let Some(credentials) = &self.credentials {
            let timestamp = request_timestamp();
            let headers =
                credentials.headers(&timestamp, method.as_str(), &path_and_query, "")?;
            for (name, value) in headers {
                request = request.header(name, value);
            }
        }

        debug!("{} {}", method, url);

        let response = request.send().await?;
        let status = response.status();
        let cursor = response
            .headers()
            .get(CURSOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text)?;

        Ok(ApiResponse {
            status: status.as_u16(),
            cursor,
            body,
        })
    }
}

/// Join query pairs onto the path. Values stay unescaped, so parameters
/// must use URL-safe forms (`Z`-suffixed timestamps, plain identifiers).
fn path_with_query(path: &str, query: &[(String, String)]) -> String {
    if query.is_empty() {
        return path.to_string();
    }
    let pairs: Vec<String> = query
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    format!("{}?{}", path, pairs.join("&"))
}
