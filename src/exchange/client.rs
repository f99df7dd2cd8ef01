use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::exchange::candles::fill_span;
use crate::exchange::pagination::fetch_all_pages;
use crate::exchange::transport::Transport;
use crate::models::{Candle, Granularity, TimeSpan};

/// Trading account for one currency.
///
/// Monetary amounts stay as the decimal strings the backend sends; parsing
/// them into floats is the caller's call.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: String,
    pub currency: String,
    pub balance: String,
    pub available: String,
    pub hold: String,
}

/// One balance-changing event on an account.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: String,
    pub balance: String,
    pub created_at: String,
    #[serde(default)]
    pub details: Value,
}

/// Deposit or withdrawal record.
#[derive(Debug, Clone, Deserialize)]
pub struct Transfer {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: String,
    pub created_at: String,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub details: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    pub id: String,
    pub product_id: String,
    pub side: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    pub created_at: String,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub filled_size: Option<String>,
}

/// Current fee schedule for the authenticated profile.
#[derive(Debug, Clone, Deserialize)]
pub struct Fees {
    pub maker_fee_rate: String,
    pub taker_fee_rate: String,
    #[serde(default)]
    pub usd_volume: Option<String>,
}

/// Typed surface over the exchange REST API.
///
/// Every call runs through the paged fetcher, so multi-page listings come
/// back whole without the caller thinking about cursors.
pub struct ExchangeClient {
    transport: Arc<dyn Transport>,
}

impl ExchangeClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn accounts(&self) -> Result<Vec<Account>> {
        self.list("/accounts", &[]).await
    }

    /// Accounts keyed by currency, optionally skipping zero balances.
    pub async fn accounts_by_currency(
        &self,
        exclude_empty: bool,
    ) -> Result<HashMap<String, Account>> {
        let mut by_currency = HashMap::new();
        for account in self.accounts().await? {
            let balance: f64 = account.balance.parse().unwrap_or(0.0);
            if exclude_empty && balance == 0.0 {
                continue;
            }
            by_currency.insert(account.currency.clone(), account);
        }
        Ok(by_currency)
    }

    pub async fn account_ledger(&self, account_id: &str) -> Result<Vec<LedgerEntry>> {
        self.list(&format!("/accounts/{account_id}/ledger"), &[])
            .await
    }

    pub async fn transfers(&self) -> Result<Vec<Transfer>> {
        self.list("/transfers", &[]).await
    }

    /// Orders filtered by status (`open`, `pending`, `active`, `done` or
    /// `all`).
    pub async fn orders(&self, status: &str) -> Result<Vec<Order>> {
        let query = vec![("status".to_string(), status.to_string())];
        self.list("/orders", &query).await
    }

    /// Orders with the given status, grouped per product.
    pub async fn orders_by_product(
        &self,
        status: &str,
    ) -> Result<HashMap<String, Vec<Order>>> {
        let mut by_product: HashMap<String, Vec<Order>> = HashMap::new();
        for order in self.orders(status).await? {
            by_product
                .entry(order.product_id.clone())
                .or_default()
                .push(order);
        }
        Ok(by_product)
    }

    pub async fn fees(&self) -> Result<Fees> {
        let records = fetch_all_pages(self.transport.as_ref(), Method::GET, "/fees", &[]).await?;
        let record = records.into_iter().next().unwrap_or(Value::Null);
        Ok(serde_json::from_value(record)?)
    }

    /// Candles covering `span`, batched under the per-request point cap.
    pub async fn candles(
        &self,
        product_id: &str,
        granularity: Granularity,
        span: TimeSpan,
    ) -> Result<Vec<Candle>> {
        fill_span(self.transport.as_ref(), product_id, granularity, span).await
    }

    async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<Vec<T>> {
        let records = fetch_all_pages(self.transport.as_ref(), Method::GET, path, query).await?;
        records
            .into_iter()
            .map(|record| Ok(serde_json::from_value(record)?))
            .collect()
    }
}
