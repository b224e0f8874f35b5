use crate::core::errors::ExchangeError;
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{instrument, trace};

/// HTTP primitive exchange adapters fetch snapshots through
///
/// Tests substitute an in-memory implementation.
#[async_trait]
pub trait RestClient: Send + Sync {
    /// GET `endpoint` and return the raw response body
    async fn get_text(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
    ) -> Result<String, ExchangeError>;
}

#[derive(Clone, Debug)]
pub struct RestClientConfig {
    pub base_url: String,
    /// Name recorded on request spans
    pub exchange_name: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl RestClientConfig {
    pub fn new(base_url: String, exchange_name: String) -> Self {
        Self {
            base_url,
            exchange_name,
            timeout_seconds: 30,
            user_agent: concat!("huobi-adapter/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}

/// `RestClient` backed by reqwest
#[derive(Clone, Debug)]
pub struct ReqwestRest {
    client: Client,
    config: RestClientConfig,
}

impl ReqwestRest {
    pub fn new(config: RestClientConfig) -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ExchangeError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &RestClientConfig {
        &self.config
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url, endpoint)
    }

    async fn read_body(&self, response: Response) -> Result<String, ExchangeError> {
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ExchangeError::NetworkError(format!("Failed to read response body: {}", e))
        })?;
        trace!(%status, body = %body, "Response received");

        if !status.is_success() {
            return Err(ExchangeError::ApiError {
                code: i32::from(status.as_u16()),
                message: body,
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl RestClient for ReqwestRest {
    #[instrument(skip(self, query_params), fields(exchange = %self.config.exchange_name))]
    async fn get_text(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
    ) -> Result<String, ExchangeError> {
        let response = self
            .client
            .get(self.url(endpoint))
            .query(query_params)
            .send()
            .await
            .map_err(|e| ExchangeError::NetworkError(format!("Request failed: {}", e)))?;

        self.read_body(response).await
    }
}
