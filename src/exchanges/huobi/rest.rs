use crate::core::errors::ExchangeError;
use crate::core::kernel::{RestClient, SignedRequest, Signer};
use crate::core::types::{OrderRequest, OrderResponse};
use crate::exchanges::huobi::types::HuobiSymbolsResponse;
use serde_json::Value;
use tracing::instrument;

pub const COMMON_SYMBOLS_ENDPOINT: &str = "/v2/settings/common/symbols";

/// Huobi REST API client
#[derive(Debug, Clone)]
pub struct HuobiRest<R: RestClient> {
    rest_client: R,
}

impl<R: RestClient> HuobiRest<R> {
    pub fn new(rest_client: R) -> Self {
        Self { rest_client }
    }

    pub fn rest_client(&self) -> &R {
        &self.rest_client
    }

    /// Fetch the tradable symbols snapshot
    #[instrument(skip(self), fields(exchange = "huobi"))]
    pub async fn get_common_symbols(&self) -> Result<HuobiSymbolsResponse, ExchangeError> {
        let body = self
            .rest_client
            .get_text(COMMON_SYMBOLS_ENDPOINT, &[])
            .await?;
        parse_common_symbols(&body)
    }
}

pub fn parse_common_symbols(body: &str) -> Result<HuobiSymbolsResponse, ExchangeError> {
    serde_json::from_str(body).map_err(|e| {
        ExchangeError::ProtocolDecode(format!("Failed to parse symbols snapshot: {}", e))
    })
}

/// Legacy form body of an order request
pub fn order_body(symbol_name: &str, order: &OrderRequest) -> String {
    format!(
        "command={}&currencyPair={}&rate={}&amount={}",
        order.side.as_str(),
        urlencoding::encode(symbol_name),
        order.price,
        order.quantity
    )
}

/// Order body with nonce and signature headers applied
pub fn signed_order_body(
    signer: &dyn Signer,
    symbol_name: &str,
    order: &OrderRequest,
    nonce_ms: u64,
) -> Result<SignedRequest, ExchangeError> {
    signer.sign_request("POST", "/", &order_body(symbol_name, order), nonce_ms)
}

/// Parse a legacy order reply: `{"orderNumber": ..}` or `{"error": ".."}`
pub fn parse_order_response(body: &str) -> Result<OrderResponse, ExchangeError> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        ExchangeError::ProtocolDecode(format!("Failed to parse order response: {}", e))
    })?;

    if let Some(error) = value.get("error") {
        let message = error
            .as_str()
            .map_or_else(|| error.to_string(), str::to_string);
        return Err(ExchangeError::ApiError { code: -1, message });
    }

    let order_id = match value.get("orderNumber") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => {
            return Err(ExchangeError::ProtocolDecode(
                "Order response has no orderNumber".to_string(),
            ))
        }
    };

    Ok(OrderResponse { order_id })
}
