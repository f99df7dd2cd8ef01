use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use candela::cache::{CandleCache, JsonFileStore};
use candela::config::Config;
use candela::exchange::HttpTransport;
use candela::models::{parse_bound, Granularity};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    // Args: [PRODUCT] [GRANULARITY_SECS] ["YYYY-MM-DD HH:MM"] ["YYYY-MM-DD HH:MM"]
    let args: Vec<String> = std::env::args().collect();

    let product_id = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| cfg.product_id.clone());
    let granularity_secs: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(60);
    let granularity = Granularity::from_secs(granularity_secs)?;
    let start = args.get(3).map(|s| parse_bound(s)).transpose()?;
    let end = args.get(4).map(|s| parse_bound(s)).transpose()?;

    let transport = Arc::new(HttpTransport::new(cfg.api_url.clone(), cfg.credentials()));
    let store = Box::new(JsonFileStore::new(cfg.data_dir.clone()));
    let cache = CandleCache::new(transport, store);

    // Dropping the query on ctrl-c is safe: the store is only written
    // after every pull has landed.
    let series = tokio::select! {
        result = cache.get_candles(&product_id, granularity, start, end) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted; stored series left as it was");
            return Ok(());
        }
    };

    println!("{} {}: {} candles", product_id, granularity, series.len());
    if let (Some(first), Some(last)) = (series.first(), series.last()) {
        println!("  from {}  (open  {})", first.display_time(), first.open);
        println!("  to   {}  (close {})", last.display_time(), last.close);
    }

    Ok(())
}
