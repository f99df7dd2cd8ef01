use anyhow::Result;
use std::collections::HashMap;
use tracing_subscriber::{fmt, EnvFilter};

use candela::config::Config;
use candela::stream::{Feed, FeedMessage, TICKER_CHANNEL};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    // Args: any number of products; default is the configured one
    let args: Vec<String> = std::env::args().collect();
    let products: Vec<String> = if args.len() > 1 {
        args[1..].to_vec()
    } else {
        vec![cfg.product_id.clone()]
    };

    let credentials = cfg.credentials();
    let channels = vec![TICKER_CHANNEL.to_string()];
    let mut feed = Feed::connect(&cfg.ws_url, &products, &channels, credentials.as_ref()).await?;

    println!("Streaming {} (ctrl-c to stop)", products.join(", "));

    let mut last_price: HashMap<String, f64> = HashMap::new();

    loop {
        tokio::select! {
            message = feed.next() => {
                match message? {
                    Some(FeedMessage::Ticker(ticker)) => {
                        let Some(price) = ticker.price_f64() else { continue };
                        let arrow = direction_arrow(last_price.get(&ticker.product_id), price);
                        println!("{:<10} {:>12.2} {}", ticker.product_id, price, arrow);
                        last_price.insert(ticker.product_id.clone(), price);
                    }
                    Some(_) => {}
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                feed.close().await.ok();
                break;
            }
        }
    }

    Ok(())
}

/// Price direction since the previous tick; a first tick shows flat.
fn direction_arrow(prev: Option<&f64>, price: f64) -> &'static str {
    match prev {
        Some(prev) if price > *prev => "↑",
        Some(prev) if price < *prev => "↓",
        _ => "→",
    }
}
