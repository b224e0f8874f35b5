use crate::core::errors::ExchangeError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Realtime connection identity
///
/// The discriminants match the connection indices the client framework
/// assigns, so `Public` is always connection 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HuobiChannel {
    Public = 0,
    Feed = 1,
    V2 = 2,
}

impl HuobiChannel {
    pub const ALL: [Self; 3] = [Self::Public, Self::Feed, Self::V2];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Public),
            1 => Some(Self::Feed),
            2 => Some(Self::V2),
            _ => None,
        }
    }

    /// Legacy channels wrap every message in its own gzip stream
    pub fn is_gzipped(self) -> bool {
        matches!(self, Self::Public | Self::Feed)
    }

    pub fn is_v2(self) -> bool {
        self == Self::V2
    }
}

impl fmt::Display for HuobiChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Public => "public",
            Self::Feed => "feed",
            Self::V2 => "v2",
        };
        write!(f, "{}", name)
    }
}

/// `GET /v2/settings/common/symbols` response envelope
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HuobiSymbolsResponse {
    pub status: Option<String>,
    pub data: Option<Vec<HuobiSymbol>>,
}

/// One entry of the symbols snapshot
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HuobiSymbol {
    pub sc: String, // symbol code, e.g. btcusdt
    pub bc: String, // base currency code
    pub qc: String, // quote currency code
    pub state: String,
}

/// Online pair extracted from the symbols snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuobiPairInfo {
    pub name: String,
    pub base_currency_name: String,
    pub quote_currency_name: String,
}

/// Best bid/offer payload of a `market.<symbol>.bbo` push
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuobiBboTick {
    pub symbol: String,
    pub ask: Decimal,
    pub ask_size: Decimal,
    pub bid: Decimal,
    pub bid_size: Decimal,
}

/// Legacy subscribe request
#[derive(Debug, Serialize)]
pub struct HuobiSubscribeRequest<'a> {
    pub sub: &'a str,
    pub id: String,
}

/// v2 authentication request
#[derive(Debug, Serialize)]
pub struct HuobiAuthRequest<'a> {
    pub action: &'static str,
    pub ch: &'static str,
    pub params: HuobiAuthParams<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HuobiAuthParams<'a> {
    pub auth_type: &'static str,
    pub access_key: &'a str,
    pub signature_method: &'static str,
    pub signature_version: &'static str,
    pub timestamp: &'a str,
    pub signature: String,
}

/// REST and WebSocket endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HuobiEndpoints {
    pub rest_url: String,
    pub public_ws_url: String,
    pub feed_ws_url: String,
    pub v2_ws_url: String,
}

impl Default for HuobiEndpoints {
    fn default() -> Self {
        Self {
            rest_url: "https://api-aws.huobi.pro".to_string(),
            public_ws_url: "wss://api.huobi.pro/ws".to_string(),
            feed_ws_url: "wss://api.huobi.pro/feed".to_string(),
            v2_ws_url: "wss://api.huobi.pro/ws/v2".to_string(),
        }
    }
}

impl HuobiEndpoints {
    pub fn ws_url(&self, channel: HuobiChannel) -> &str {
        match channel {
            HuobiChannel::Public => &self.public_ws_url,
            HuobiChannel::Feed => &self.feed_ws_url,
            HuobiChannel::V2 => &self.v2_ws_url,
        }
    }

    /// Host and path of the v2 endpoint, as they appear in the auth sign-string
    pub fn v2_host_and_path(&self) -> Result<(String, String), ExchangeError> {
        let url = url::Url::parse(&self.v2_ws_url).map_err(|e| {
            ExchangeError::InvalidParameters(format!(
                "Invalid v2 WebSocket URL '{}': {}",
                self.v2_ws_url, e
            ))
        })?;

        let host = url.host_str().ok_or_else(|| {
            ExchangeError::InvalidParameters(format!(
                "v2 WebSocket URL '{}' has no host",
                self.v2_ws_url
            ))
        })?;

        Ok((host.to_string(), url.path().to_string()))
    }
}
