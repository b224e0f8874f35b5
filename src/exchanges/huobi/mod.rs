pub mod catalog;
pub mod codec;
pub mod compression;
pub mod conversions;
pub mod signer;
pub mod types;

pub mod builder;
pub mod connector;
pub mod rest;

use crate::core::types::{Coin, CoinMap};

// Re-export main components
pub use builder::{build_connector, HuobiBuilder};
pub use catalog::{build_pairs, SymbolCatalog};
pub use codec::{HuobiCodec, HuobiMessage};
pub use connector::{HuobiConnector, MarketData, ReadyHandler, Trading};
pub use rest::HuobiRest;
pub use signer::HuobiSigner;
pub use types::{
    HuobiBboTick, HuobiChannel, HuobiEndpoints, HuobiPairInfo, HuobiSymbol, HuobiSymbolsResponse,
};

/// Currency codes this client framework knows how to trade on Huobi
pub fn huobi_coin_map() -> CoinMap {
    CoinMap::new()
        .with_entry("btc", Coin::Btc)
        .with_entry("eth", Coin::Eth)
        .with_entry("kcs", Coin::Kcs)
        .with_entry("trx", Coin::Trx)
        .with_entry("usdt", Coin::Usdt)
}
