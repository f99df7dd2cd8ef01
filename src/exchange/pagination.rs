use reqwest::Method;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};
use crate::exchange::transport::{ApiResponse, Transport};

const RATE_LIMIT_RETRIES: u32 = 3;
const RATE_LIMIT_BACKOFF: Duration = Duration::from_millis(250);

/// Fetches every page behind an endpoint, following `cb-after` cursors
/// until the backend stops attaching one.
///
/// Page records are concatenated in arrival order; an object body counts
/// as a single record, an array body as many. The caller's query is sent
/// unchanged on the first request and extended with `after` on the rest.
pub async fn fetch_all_pages(
    transport: &dyn Transport,
    method: Method,
    path: &str,
    query: &[(String, String)],
) -> Result<Vec<Value>> {
    let mut records = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let mut page_query = query.to_vec();
        if let Some(after) = &cursor {
            page_query.push(("after".to_string(), after.clone()));
        }

        let response = send_page(transport, method.clone(), path, &page_query).await?;
        pages += 1;

        match response.body {
            Value::Array(items) => records.extend(items),
            other => records.push(other),
        }

        match response.cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    debug!(
        "Collected {} records from {} in {} page(s)",
        records.len(),
        path,
        pages
    );
    Ok(records)
}

/// One page request, retried with doubling backoff while the backend rate
/// limits. Every other failure aborts immediately. A rate-limited request
/// was rejected before it was processed, so resending it is safe.
async fn send_page(
    transport: &dyn Transport,
    method: Method,
    path: &str,
    query: &[(String, String)],
) -> Result<ApiResponse> {
    let mut backoff = RATE_LIMIT_BACKOFF;
    for _ in 0..RATE_LIMIT_RETRIES {
        match transport.send(method.clone(), path, query).await {
            Err(ClientError::Api { status: 429, .. }) => {
                warn!("Rate limited on {}; retrying in {:?}", path, backoff);
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
            other => return other,
        }
    }
    transport.send(method, path, query).await
}
