use crate::core::errors::ExchangeError;
use crate::core::types::{CoinMap, Pair, SymbolId};
use crate::exchanges::huobi::conversions::{convert_huobi_symbol, convert_pair_info};
use crate::exchanges::huobi::types::{HuobiPairInfo, HuobiSymbolsResponse};
use std::collections::HashMap;
use tracing::warn;

const ONLINE: &str = "online";

/// Extract the online pairs of a symbols snapshot, in snapshot order
pub fn build_pairs(response: HuobiSymbolsResponse) -> Result<Vec<HuobiPairInfo>, ExchangeError> {
    let status = response.status.unwrap_or_default();
    if status != "ok" {
        return Err(ExchangeError::ApiError {
            code: -1,
            message: format!("Symbols snapshot returned status '{}'", status),
        });
    }

    let data = response.data.ok_or_else(|| ExchangeError::ApiError {
        code: -1,
        message: "Symbols snapshot has no data field".to_string(),
    })?;

    Ok(data
        .iter()
        .filter(|symbol| symbol.state == ONLINE)
        .map(convert_huobi_symbol)
        .collect())
}

/// Index-addressable table of tradable pairs
///
/// Slot 0 always holds the undefined pair, so a live pair never resolves to
/// [`SymbolId::UNDEFINED`].
#[derive(Debug, Clone)]
pub struct SymbolCatalog {
    pairs: Vec<Pair>,
    by_name: HashMap<String, SymbolId>,
}

impl Default for SymbolCatalog {
    fn default() -> Self {
        Self {
            pairs: vec![Pair::undefined()],
            by_name: HashMap::new(),
        }
    }
}

impl SymbolCatalog {
    pub fn build(infos: &[HuobiPairInfo], coins: &CoinMap) -> Self {
        let mut catalog = Self::default();
        catalog.pairs.reserve(infos.len());

        for info in infos {
            if catalog.by_name.contains_key(&info.name) {
                warn!(
                    exchange = "huobi",
                    symbol = %info.name,
                    "Duplicate symbol in snapshot, keeping the first"
                );
                continue;
            }
            let id = SymbolId(catalog.pairs.len());
            catalog.pairs.push(convert_pair_info(info, coins));
            catalog.by_name.insert(info.name.clone(), id);
        }

        catalog
    }

    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.by_name.get(name).copied()
    }

    pub fn pair(&self, id: SymbolId) -> Option<&Pair> {
        self.pairs.get(id.index())
    }

    /// Exchange name of a tradable pair; `None` for the undefined slot
    pub fn name(&self, id: SymbolId) -> Option<&str> {
        if id.is_undefined() {
            return None;
        }
        self.pair(id).map(|pair| pair.name.as_str())
    }

    /// Number of slots, the undefined one included
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True when no tradable pair is loaded
    pub fn is_empty(&self) -> bool {
        self.pairs.len() <= 1
    }

    /// Tradable pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Pair)> {
        self.pairs
            .iter()
            .enumerate()
            .skip(1)
            .map(|(index, pair)| (SymbolId(index), pair))
    }
}
