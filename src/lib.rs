pub mod core;
pub mod exchanges;

pub use crate::core::{
    config::ExchangeConfig,
    errors::ExchangeError,
    traits::{ExchangeConnector, MarketDataSource, OrderPlacer},
    types::*,
};
pub use crate::exchanges::huobi::{HuobiBuilder, HuobiChannel, HuobiConnector};
