use crate::core::errors::ExchangeError;
use crate::core::kernel::WsCodec;
use crate::core::types::conversion::json_to_decimal;
use crate::exchanges::huobi::compression::decompress;
use crate::exchanges::huobi::signer::ws_auth_signature;
use crate::exchanges::huobi::types::{
    HuobiAuthParams, HuobiAuthRequest, HuobiBboTick, HuobiChannel, HuobiSubscribeRequest,
};
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};

/// Inbound realtime message, classified by shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuobiMessage {
    /// Legacy keepalive, `{"ping": ts}`
    Ping { ts: u64 },
    /// v2 keepalive, `{"action":"ping","data":{"ts": ts}}`
    PingV2 { ts: u64 },
    PriceBookTicker(HuobiBboTick),
    AccountNotification,
    AuthResponse { success: bool },
    Unknown,
}

static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide monotonic id for outbound requests
pub fn next_request_id() -> u64 {
    REQUEST_ID.fetch_add(1, Ordering::Relaxed)
}

pub fn price_book_ticker_topic(symbol_name: &str) -> String {
    format!("market.{}.bbo", symbol_name)
}

/// Classify one text frame
pub fn decode(text: &str, is_v2: bool) -> Result<HuobiMessage, ExchangeError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| ExchangeError::ProtocolDecode(format!("Failed to parse JSON: {}", e)))?;

    let object = value.as_object().ok_or_else(|| {
        ExchangeError::ProtocolDecode("Expected a JSON object at the top level".to_string())
    })?;

    if is_v2 {
        decode_v2(object)
    } else {
        decode_legacy(object)
    }
}

fn decode_v2(object: &Map<String, Value>) -> Result<HuobiMessage, ExchangeError> {
    let ch = object.get("ch").and_then(Value::as_str);

    match object.get("action").and_then(Value::as_str) {
        Some("ping") => {
            let ts = object
                .get("data")
                .and_then(|data| data.get("ts"))
                .and_then(Value::as_u64)
                .ok_or_else(|| missing_field("data.ts", "v2 ping"))?;
            Ok(HuobiMessage::PingV2 { ts })
        }
        Some("req") if ch == Some("auth") => {
            // the status code sits on the envelope, not under `data`
            let code = object
                .get("code")
                .and_then(Value::as_i64)
                .ok_or_else(|| missing_field("code", "auth response"))?;
            Ok(HuobiMessage::AuthResponse {
                success: code == 200,
            })
        }
        Some("push") if ch.is_some_and(|ch| ch.starts_with("accounts.update")) => {
            Ok(HuobiMessage::AccountNotification)
        }
        _ => Ok(HuobiMessage::Unknown),
    }
}

fn decode_legacy(object: &Map<String, Value>) -> Result<HuobiMessage, ExchangeError> {
    if let Some(ping) = object.get("ping") {
        let ts = ping
            .as_u64()
            .ok_or_else(|| missing_field("ping", "legacy ping"))?;
        return Ok(HuobiMessage::Ping { ts });
    }

    match object.get("ch").and_then(Value::as_str) {
        Some(ch) if ch.starts_with("market.") && ch.ends_with(".bbo") => {
            let tick = object
                .get("tick")
                .and_then(Value::as_object)
                .ok_or_else(|| missing_field("tick", ch))?;
            decode_bbo_tick(tick).map(HuobiMessage::PriceBookTicker)
        }
        _ => Ok(HuobiMessage::Unknown),
    }
}

fn decode_bbo_tick(tick: &Map<String, Value>) -> Result<HuobiBboTick, ExchangeError> {
    let symbol = tick
        .get("symbol")
        .and_then(Value::as_str)
        .ok_or_else(|| missing_field("tick.symbol", "bbo"))?;

    let decimal = |key: &'static str| {
        tick.get(key)
            .and_then(json_to_decimal)
            .ok_or_else(|| missing_field(key, "bbo"))
    };

    Ok(HuobiBboTick {
        symbol: symbol.to_string(),
        ask: decimal("ask")?,
        ask_size: decimal("askSize")?,
        bid: decimal("bid")?,
        bid_size: decimal("bidSize")?,
    })
}

fn missing_field(field: &str, context: &str) -> ExchangeError {
    ExchangeError::ProtocolDecode(format!(
        "Missing or invalid field '{}' in {} message",
        field, context
    ))
}

/// Reply to a keepalive, echoing its timestamp
pub fn encode_pong(ts: u64, is_v2: bool) -> String {
    if is_v2 {
        json!({ "action": "pong", "data": { "ts": ts } }).to_string()
    } else {
        json!({ "pong": ts }).to_string()
    }
}

/// Subscribe request for one topic
///
/// The v2 channel has no subscribe grammar here and is rejected.
pub fn encode_subscribe(topic: &str, is_v2: bool) -> Result<String, ExchangeError> {
    if is_v2 {
        return Err(ExchangeError::ChannelMisuse {
            channel: HuobiChannel::V2.to_string(),
            operation: "subscribe",
        });
    }

    let request = HuobiSubscribeRequest {
        sub: topic,
        id: next_request_id().to_string(),
    };
    Ok(serde_json::to_string(&request)?)
}

/// UTC timestamp in the format the v2 auth handshake expects
pub fn auth_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// v2 auth request signed with a fresh timestamp
pub fn encode_auth(
    hostname: &str,
    path: &str,
    api_key: &str,
    api_secret: &str,
) -> Result<String, ExchangeError> {
    encode_auth_at(hostname, path, api_key, api_secret, &auth_timestamp())
}

pub fn encode_auth_at(
    hostname: &str,
    path: &str,
    api_key: &str,
    api_secret: &str,
    timestamp: &str,
) -> Result<String, ExchangeError> {
    let payload = auth_sign_string(hostname, path, api_key, timestamp);

    let request = HuobiAuthRequest {
        action: "req",
        ch: "auth",
        params: HuobiAuthParams {
            auth_type: "api",
            access_key: api_key,
            signature_method: "HmacSHA256",
            signature_version: "2.1",
            timestamp,
            signature: ws_auth_signature(api_secret, &payload)?,
        },
    };
    Ok(serde_json::to_string(&request)?)
}

pub fn auth_sign_string(hostname: &str, path: &str, api_key: &str, timestamp: &str) -> String {
    format!(
        "GET\n{}\n{}\naccessKey={}&signatureMethod=HmacSHA256&signatureVersion=2.1&timestamp={}",
        hostname,
        path,
        api_key,
        urlencoding::encode(timestamp)
    )
}

/// Frame codec bound to one Huobi channel
#[derive(Debug, Clone, Copy)]
pub struct HuobiCodec {
    channel: HuobiChannel,
}

impl HuobiCodec {
    pub fn new(channel: HuobiChannel) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> HuobiChannel {
        self.channel
    }
}

impl WsCodec for HuobiCodec {
    type Message = HuobiMessage;

    fn encode_subscription(&self, topic: &str) -> Result<String, ExchangeError> {
        encode_subscribe(topic, self.channel.is_v2())
    }

    fn decode_message(&self, payload: &[u8]) -> Result<Self::Message, ExchangeError> {
        let text = decompress(payload, self.channel)?;
        decode(&text, self.channel.is_v2())
    }
}
