use crate::core::types::{CoinMap, Pair, Price, PriceBookTicker, Quantity, SymbolId};
use crate::exchanges::huobi::types::{HuobiBboTick, HuobiPairInfo, HuobiSymbol};

/// Convert a snapshot entry into pair info
pub fn convert_huobi_symbol(symbol: &HuobiSymbol) -> HuobiPairInfo {
    HuobiPairInfo {
        name: symbol.sc.clone(),
        base_currency_name: symbol.bc.clone(),
        quote_currency_name: symbol.qc.clone(),
    }
}

/// Resolve pair info against the framework's coin table
pub fn convert_pair_info(info: &HuobiPairInfo, coins: &CoinMap) -> Pair {
    Pair::new(
        coins.to_coin(&info.base_currency_name),
        coins.to_coin(&info.quote_currency_name),
        info.name.clone(),
    )
}

pub fn convert_bbo_tick(symbol: SymbolId, tick: &HuobiBboTick) -> PriceBookTicker {
    PriceBookTicker {
        symbol,
        ask_price: Price::new(tick.ask),
        ask_quantity: Quantity::new(tick.ask_size),
        bid_price: Price::new(tick.bid),
        bid_quantity: Quantity::new(tick.bid_size),
    }
}
