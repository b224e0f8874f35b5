use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Typed errors for value parsing
#[derive(Error, Debug)]
pub enum TypesError {
    #[error("Invalid price: {0}")]
    InvalidPrice(#[from] rust_decimal::Error),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
}

/// Type-safe price representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::str")] pub Decimal);

impl Price {
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Price {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type-safe quantity representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(#[serde(with = "rust_decimal::serde::str")] pub Decimal);

impl Quantity {
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Quantity {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: Decimal = s
            .parse()
            .map_err(|e: rust_decimal::Error| TypesError::InvalidQuantity(e.to_string()))?;
        Ok(Self(value))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Currencies known to the client framework.
///
/// Exchange currency codes are mapped onto this set through a [`CoinMap`];
/// codes without an entry resolve to `Undefined`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Coin {
    #[default]
    Undefined,
    Btc,
    Eth,
    Kcs,
    Trx,
    Usdt,
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::Undefined => "undefined",
            Self::Btc => "BTC",
            Self::Eth => "ETH",
            Self::Kcs => "KCS",
            Self::Trx => "TRX",
            Self::Usdt => "USDT",
        };
        write!(f, "{}", code)
    }
}

/// Exchange currency code -> [`Coin`] table
#[derive(Debug, Clone, Default)]
pub struct CoinMap {
    entries: HashMap<String, Coin>,
}

impl CoinMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry(&mut self, code: impl Into<String>, coin: Coin) {
        self.entries.insert(code.into(), coin);
    }

    pub fn with_entry(mut self, code: impl Into<String>, coin: Coin) -> Self {
        self.add_entry(code, coin);
        self
    }

    pub fn to_coin(&self, code: &str) -> Coin {
        self.entries.get(code).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Index of a pair in the symbol catalog.
///
/// Index 0 is reserved for the undefined pair and never names a tradable
/// instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(pub usize);

impl SymbolId {
    pub const UNDEFINED: Self = Self(0);

    pub fn index(self) -> usize {
        self.0
    }

    pub fn is_undefined(self) -> bool {
        self == Self::UNDEFINED
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A tradable pair resolved against the framework's coin table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub name: String,
    pub base: Coin,
    pub quote: Coin,
}

impl Pair {
    pub fn new(base: Coin, quote: Coin, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base,
            quote,
        }
    }

    pub fn undefined() -> Self {
        Self::new(Coin::Undefined, Coin::Undefined, "undefined")
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/{})", self.name, self.base, self.quote)
    }
}

/// Normalized best bid/offer update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBookTicker {
    pub symbol: SymbolId,
    pub ask_price: Price,
    pub ask_quantity: Quantity,
    pub bid_price: Price,
    pub bid_quantity: Quantity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: SymbolId,
    pub side: OrderSide,
    pub price: Price,
    pub quantity: Quantity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub order_id: String,
}

/// Status change of a previously placed order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub order_id: String,
}

/// Conversion helpers for exchange payloads
pub mod conversion {
    use super::{Decimal, FromStr};
    use serde_json::Value;

    /// Parse a JSON string or number into an exact decimal.
    ///
    /// Numbers are converted through their literal text so `100.1` stays
    /// `100.1` instead of picking up binary floating point noise. Values a
    /// `Decimal` cannot hold exactly are rejected in either form.
    pub fn json_to_decimal(value: &Value) -> Option<Decimal> {
        match value {
            Value::String(s) => parse_decimal(s),
            Value::Number(n) => parse_decimal(&n.to_string()),
            _ => None,
        }
    }

    /// Parse plain or scientific decimal notation without rounding
    pub fn parse_decimal(s: &str) -> Option<Decimal> {
        let s = s.trim();
        if s.contains(['e', 'E']) {
            // out of range exponents already fail here
            return Decimal::from_scientific(s).ok();
        }

        let value = Decimal::from_str(s).ok()?;
        (value.normalize().to_string() == canonical_plain(s)).then_some(value)
    }

    /// `s` with sign, leading and trailing zeros stripped the way
    /// `Decimal::normalize` renders it
    fn canonical_plain(s: &str) -> String {
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let (int, frac) = digits.split_once('.').unwrap_or((digits, ""));
        let int = int.trim_start_matches('0');
        let frac = frac.trim_end_matches('0');

        let mut out = String::new();
        out.push_str(if int.is_empty() { "0" } else { int });
        if !frac.is_empty() {
            out.push('.');
            out.push_str(frac);
        }
        if negative && out != "0" {
            out.insert(0, '-');
        }
        out
    }
}
