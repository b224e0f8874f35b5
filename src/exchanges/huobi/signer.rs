use crate::core::errors::ExchangeError;
use crate::core::kernel::signer::{hmac_sha256, hmac_sha512, to_base64};
use crate::core::kernel::{SignedRequest, Signer};
use chrono::Utc;
use std::collections::HashMap;

/// REST body signature: HMAC-SHA512, lowercase hex
pub fn rest_signature(secret: &str, body: &str) -> Result<String, ExchangeError> {
    Ok(hex::encode(hmac_sha512(secret, body)?))
}

/// v2 WebSocket auth signature: HMAC-SHA256, standard base64
pub fn ws_auth_signature(secret: &str, payload: &str) -> Result<String, ExchangeError> {
    Ok(to_base64(&hmac_sha256(secret, payload)?))
}

/// Milliseconds since the epoch, used as the request nonce
pub fn current_nonce() -> Result<u64, ExchangeError> {
    u64::try_from(Utc::now().timestamp_millis())
        .map_err(|e| ExchangeError::Other(format!("Clock is before the epoch: {}", e)))
}

pub fn append_nonce(body: &str, nonce_ms: u64) -> String {
    if body.is_empty() {
        format!("nonce={}", nonce_ms)
    } else {
        format!("{}&nonce={}", body, nonce_ms)
    }
}

/// Signs legacy form-encoded REST requests
pub struct HuobiSigner {
    api_key: String,
    secret_key: String,
}

impl HuobiSigner {
    pub fn new(api_key: String, secret_key: String) -> Self {
        Self {
            api_key,
            secret_key,
        }
    }
}

impl Signer for HuobiSigner {
    fn sign_request(
        &self,
        _method: &str,
        _endpoint: &str,
        body: &str,
        timestamp: u64,
    ) -> Result<SignedRequest, ExchangeError> {
        let body = append_nonce(body, timestamp);
        let signature = rest_signature(&self.secret_key, &body)?;

        let mut headers = HashMap::new();
        headers.insert("Key".to_string(), self.api_key.clone());
        headers.insert("Sign".to_string(), signature);
        headers.insert(
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        );

        Ok(SignedRequest { headers, body })
    }
}
