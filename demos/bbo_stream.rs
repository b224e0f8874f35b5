use huobi_adapter::core::config::ExchangeConfig;
use huobi_adapter::core::traits::MarketDataSource;
use huobi_adapter::core::types::PriceBookTicker;
use huobi_adapter::exchanges::huobi::{HuobiBuilder, HuobiChannel};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Credentials are optional; without them the v2 channel stays unauthenticated
    let config =
        ExchangeConfig::from_env_file("HUOBI").unwrap_or_else(|_| ExchangeConfig::read_only());
    let connector = Arc::new(HuobiBuilder::new(config).build()?);

    let count = connector.load_symbols().await?;
    info!(count, "Symbols loaded");

    connector.set_ready_handler(Arc::new(|channel: HuobiChannel| {
        info!(%channel, "Channel ready");
    }));

    for name in ["btcusdt", "ethusdt"] {
        let Some(symbol) = connector.lookup_symbol(name) else {
            info!(name, "Symbol not listed, skipping");
            continue;
        };
        connector.subscribe_price_book_ticker(
            HuobiChannel::Public,
            symbol,
            Arc::new(|ticker: &PriceBookTicker| {
                println!(
                    "{} bid {} x {} | ask {} x {}",
                    ticker.symbol,
                    ticker.bid_price,
                    ticker.bid_quantity,
                    ticker.ask_price,
                    ticker.ask_quantity
                );
            }),
        )?;
    }

    let mut tasks = Vec::new();
    for channel in [HuobiChannel::Public, HuobiChannel::V2] {
        let connector = connector.clone();
        tasks.push(tokio::spawn(async move {
            let session = connector.ws_session(channel);
            connector.run_channel(channel, session).await
        }));
    }

    sleep(Duration::from_secs(30)).await;
    for task in tasks {
        task.abort();
    }

    info!(authenticated = connector.is_authenticated(), "Done");
    Ok(())
}
