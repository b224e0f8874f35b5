use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{ReqwestRest, RestClient, RestClientConfig, WsConfig};
use crate::core::types::CoinMap;
use crate::exchanges::huobi::connector::HuobiConnector;
use crate::exchanges::huobi::huobi_coin_map;
use crate::exchanges::huobi::types::HuobiEndpoints;

/// Assembles a [`HuobiConnector`] from configuration
pub struct HuobiBuilder {
    config: ExchangeConfig,
    endpoints: HuobiEndpoints,
    ws_config: WsConfig,
    coins: CoinMap,
    timeout_seconds: u64,
}

impl HuobiBuilder {
    /// `config.base_url`, when set, overrides the default REST endpoint
    pub fn new(config: ExchangeConfig) -> Self {
        let mut endpoints = HuobiEndpoints::default();
        if let Some(base_url) = &config.base_url {
            endpoints.rest_url.clone_from(base_url);
        }

        Self {
            config,
            endpoints,
            ws_config: WsConfig::default(),
            coins: huobi_coin_map(),
            timeout_seconds: 30,
        }
    }

    pub fn with_endpoints(mut self, endpoints: HuobiEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_ws_config(mut self, ws_config: WsConfig) -> Self {
        self.ws_config = ws_config;
        self
    }

    pub fn with_coin_map(mut self, coins: CoinMap) -> Self {
        self.coins = coins;
        self
    }

    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Build a connector on top of the reqwest client
    pub fn build(self) -> Result<HuobiConnector<ReqwestRest>, ExchangeError> {
        let rest_config =
            RestClientConfig::new(self.endpoints.rest_url.clone(), "huobi".to_string())
                .with_timeout(self.timeout_seconds);

        let rest = ReqwestRest::new(rest_config)?;
        Ok(self.build_with_rest(rest))
    }

    /// Build a connector on top of any REST client
    pub fn build_with_rest<R: RestClient>(self, rest: R) -> HuobiConnector<R> {
        HuobiConnector::new(
            rest,
            self.config,
            self.endpoints,
            self.ws_config,
            self.coins,
        )
    }
}

/// Create a Huobi connector with default endpoints
pub fn build_connector(
    config: ExchangeConfig,
) -> Result<HuobiConnector<ReqwestRest>, ExchangeError> {
    HuobiBuilder::new(config).build()
}
