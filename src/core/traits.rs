use crate::core::{
    errors::ExchangeError,
    types::{OrderRequest, OrderResponse, OrderUpdate, PriceBookTicker, SymbolId},
};
use async_trait::async_trait;
use std::sync::Arc;

/// Callback invoked for every best bid/offer update of one symbol
pub type PriceBookTickerHandler = Arc<dyn Fn(&PriceBookTicker) + Send + Sync>;

pub type OrderUpdateHandler = Arc<dyn Fn(&OrderUpdate) + Send + Sync>;

#[async_trait]
pub trait MarketDataSource {
    /// Channel identity used by this exchange's realtime connections
    type Channel: Copy + Send + Sync;

    /// Fetch the instrument snapshot and rebuild the symbol catalog
    ///
    /// # Returns
    /// Number of tradable pairs in the catalog (the undefined sentinel excluded)
    async fn load_symbols(&self) -> Result<usize, ExchangeError>;

    /// Register `handler` for best bid/offer updates of `symbol` and request
    /// the stream on `channel`
    fn subscribe_price_book_ticker(
        &self,
        channel: Self::Channel,
        symbol: SymbolId,
        handler: PriceBookTickerHandler,
    ) -> Result<(), ExchangeError>;
}

#[async_trait]
pub trait OrderPlacer {
    /// Place a new order
    async fn place_order(&self, order: OrderRequest) -> Result<OrderResponse, ExchangeError>;

    /// Install the handler for order status changes, replacing any previous one
    fn subscribe_order_update(&self, handler: OrderUpdateHandler);
}

pub trait ExchangeConnector: MarketDataSource + OrderPlacer {}
