use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{RestClient, Signer, TungsteniteWs, WsConfig, WsSession};
use crate::core::traits::{
    ExchangeConnector, MarketDataSource, OrderPlacer, OrderUpdateHandler, PriceBookTickerHandler,
};
use crate::core::types::{CoinMap, OrderRequest, OrderResponse, SymbolId};
use crate::exchanges::huobi::catalog::SymbolCatalog;
use crate::exchanges::huobi::signer::HuobiSigner;
use crate::exchanges::huobi::types::{HuobiChannel, HuobiEndpoints};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

pub mod market_data;
pub mod trading;

pub use market_data::{MarketData, ReadyHandler, SharedCatalog};
pub use trading::Trading;

/// Huobi connector that composes the market data and trading halves
pub struct HuobiConnector<R: RestClient> {
    pub market: MarketData<R>,
    pub trading: Trading,
}

impl<R: RestClient> HuobiConnector<R> {
    pub fn new(
        rest: R,
        config: ExchangeConfig,
        endpoints: HuobiEndpoints,
        ws_config: WsConfig,
        coins: CoinMap,
    ) -> Self {
        let catalog: SharedCatalog = Arc::new(RwLock::new(Arc::new(SymbolCatalog::default())));

        let signer = config.has_credentials().then(|| {
            Arc::new(HuobiSigner::new(
                config.api_key().to_string(),
                config.secret_key().to_string(),
            )) as Arc<dyn Signer>
        });

        Self {
            trading: Trading::new(catalog.clone(), signer),
            market: MarketData::new(rest, config, endpoints, ws_config, coins, catalog),
        }
    }

    pub fn catalog(&self) -> Arc<SymbolCatalog> {
        self.market.catalog()
    }

    pub fn lookup_symbol(&self, name: &str) -> Option<SymbolId> {
        self.market.catalog().lookup(name)
    }

    pub fn set_ready_handler(&self, handler: ReadyHandler) {
        self.market.set_ready_handler(handler);
    }

    pub fn ws_session(&self, channel: HuobiChannel) -> TungsteniteWs {
        self.market.ws_session(channel)
    }

    pub fn handle_frame(&self, channel: HuobiChannel, payload: &[u8]) -> Option<String> {
        self.market.handle_frame(channel, payload)
    }

    pub async fn run_channel<S: WsSession>(
        &self,
        channel: HuobiChannel,
        session: S,
    ) -> Result<(), ExchangeError> {
        self.market.run_channel(channel, session).await
    }

    pub fn authenticate(&self) -> Result<(), ExchangeError> {
        self.market.authenticate()
    }

    pub fn is_authenticated(&self) -> bool {
        self.market.is_authenticated()
    }
}

#[async_trait]
impl<R: RestClient> MarketDataSource for HuobiConnector<R> {
    type Channel = HuobiChannel;

    async fn load_symbols(&self) -> Result<usize, ExchangeError> {
        self.market.load_symbols().await
    }

    fn subscribe_price_book_ticker(
        &self,
        channel: HuobiChannel,
        symbol: SymbolId,
        handler: PriceBookTickerHandler,
    ) -> Result<(), ExchangeError> {
        self.market.subscribe_price_book_ticker(channel, symbol, handler)
    }
}

#[async_trait]
impl<R: RestClient> OrderPlacer for HuobiConnector<R> {
    async fn place_order(&self, order: OrderRequest) -> Result<OrderResponse, ExchangeError> {
        self.trading.place_order(order).await
    }

    fn subscribe_order_update(&self, handler: OrderUpdateHandler) {
        self.trading.subscribe_order_update(handler);
    }
}

impl<R: RestClient> ExchangeConnector for HuobiConnector<R> {}
