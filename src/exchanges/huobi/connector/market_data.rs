use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{RestClient, TungsteniteWs, WsCodec, WsConfig, WsSession};
use crate::core::traits::{MarketDataSource, PriceBookTickerHandler};
use crate::core::types::{CoinMap, SymbolId};
use crate::exchanges::huobi::catalog::{build_pairs, SymbolCatalog};
use crate::exchanges::huobi::codec::{
    encode_auth, encode_pong, price_book_ticker_topic, HuobiCodec, HuobiMessage,
};
use crate::exchanges::huobi::conversions::convert_bbo_tick;
use crate::exchanges::huobi::rest::HuobiRest;
use crate::exchanges::huobi::types::{HuobiBboTick, HuobiChannel, HuobiEndpoints};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, trace, warn};

/// Catalog shared between the market data and trading halves of a connector
pub type SharedCatalog = Arc<RwLock<Arc<SymbolCatalog>>>;

/// Callback fired once a channel's connection is established
pub type ReadyHandler = Arc<dyn Fn(HuobiChannel) + Send + Sync>;

/// Huobi realtime market data
pub struct MarketData<R: RestClient> {
    rest: HuobiRest<R>,
    config: ExchangeConfig,
    endpoints: HuobiEndpoints,
    ws_config: WsConfig,
    coins: CoinMap,
    catalog: SharedCatalog,
    handlers: RwLock<HashMap<SymbolId, Vec<PriceBookTickerHandler>>>,
    outbound_tx: HashMap<HuobiChannel, mpsc::UnboundedSender<String>>,
    // receivers are parked here while their channel is not running
    outbound_rx: Mutex<HashMap<HuobiChannel, mpsc::UnboundedReceiver<String>>>,
    ready_handler: RwLock<Option<ReadyHandler>>,
    authenticated: AtomicBool,
}

impl<R: RestClient> MarketData<R> {
    pub fn new(
        rest: R,
        config: ExchangeConfig,
        endpoints: HuobiEndpoints,
        ws_config: WsConfig,
        coins: CoinMap,
        catalog: SharedCatalog,
    ) -> Self {
        let mut outbound_tx = HashMap::new();
        let mut outbound_rx = HashMap::new();
        for channel in HuobiChannel::ALL {
            let (tx, rx) = mpsc::unbounded_channel();
            outbound_tx.insert(channel, tx);
            outbound_rx.insert(channel, rx);
        }

        Self {
            rest: HuobiRest::new(rest),
            config,
            endpoints,
            ws_config,
            coins,
            catalog,
            handlers: RwLock::new(HashMap::new()),
            outbound_tx,
            outbound_rx: Mutex::new(outbound_rx),
            ready_handler: RwLock::new(None),
            authenticated: AtomicBool::new(false),
        }
    }

    pub fn catalog(&self) -> Arc<SymbolCatalog> {
        self.catalog.read().clone()
    }

    pub fn rest(&self) -> &HuobiRest<R> {
        &self.rest
    }

    pub fn endpoints(&self) -> &HuobiEndpoints {
        &self.endpoints
    }

    pub fn set_ready_handler(&self, handler: ReadyHandler) {
        *self.ready_handler.write() = Some(handler);
    }

    /// Whether the last v2 auth handshake succeeded
    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::Acquire)
    }

    /// Production WebSocket session for `channel`
    pub fn ws_session(&self, channel: HuobiChannel) -> TungsteniteWs {
        TungsteniteWs::new(
            self.endpoints.ws_url(channel).to_string(),
            "huobi".to_string(),
        )
        .with_config(self.ws_config.clone())
    }

    /// Queue a v2 auth request
    pub fn authenticate(&self) -> Result<(), ExchangeError> {
        let frame = self.auth_frame()?;
        self.enqueue(HuobiChannel::V2, frame)
    }

    fn auth_frame(&self) -> Result<String, ExchangeError> {
        if !self.config.has_credentials() {
            return Err(ExchangeError::AuthError(
                "v2 authentication requires API credentials".to_string(),
            ));
        }

        let (host, path) = self.endpoints.v2_host_and_path()?;
        encode_auth(
            &host,
            &path,
            self.config.api_key(),
            self.config.secret_key(),
        )
    }

    fn enqueue(&self, channel: HuobiChannel, frame: String) -> Result<(), ExchangeError> {
        let tx = self.outbound_tx.get(&channel).ok_or_else(|| {
            ExchangeError::Other(format!("No outbound queue for channel {}", channel))
        })?;
        tx.send(frame).map_err(|_| {
            ExchangeError::NetworkError(format!("Outbound queue for channel {} is closed", channel))
        })
    }

    /// Process one inbound frame
    ///
    /// Returns the reply to write back on the same connection, if any. Frames
    /// that fail to inflate or decode are logged and dropped.
    pub fn handle_frame(&self, channel: HuobiChannel, payload: &[u8]) -> Option<String> {
        let message = match HuobiCodec::new(channel).decode_message(payload) {
            Ok(message) => message,
            Err(e) if e.is_frame_local() => {
                warn!(exchange = "huobi", %channel, error = %e, "Dropping frame");
                return None;
            }
            Err(e) => {
                error!(exchange = "huobi", %channel, error = %e, "Failed to handle frame");
                return None;
            }
        };

        match message {
            HuobiMessage::Ping { ts } | HuobiMessage::PingV2 { ts } => {
                trace!(exchange = "huobi", %channel, ts, "Answering ping");
                Some(encode_pong(ts, channel.is_v2()))
            }
            HuobiMessage::PriceBookTicker(tick) => {
                self.dispatch_price_book_ticker(&tick);
                None
            }
            HuobiMessage::AuthResponse { success } => {
                if success {
                    info!(exchange = "huobi", "v2 channel authenticated");
                } else {
                    warn!(exchange = "huobi", "v2 authentication rejected");
                }
                self.authenticated.store(success, Ordering::Release);
                None
            }
            HuobiMessage::AccountNotification => {
                debug!(exchange = "huobi", "Account update received");
                None
            }
            HuobiMessage::Unknown => None,
        }
    }

    fn dispatch_price_book_ticker(&self, tick: &HuobiBboTick) {
        let Some(symbol) = self.catalog.read().lookup(&tick.symbol) else {
            trace!(exchange = "huobi", symbol = %tick.symbol, "Ticker for unknown symbol");
            return;
        };

        // handlers run outside the lock so they may subscribe further symbols
        let Some(handlers) = self.handlers.read().get(&symbol).cloned() else {
            return;
        };

        let ticker = convert_bbo_tick(symbol, tick);
        for handler in &handlers {
            handler(&ticker);
        }
    }

    /// Drive one connection until the peer closes it or the transport fails
    ///
    /// Frames queued for `channel` before or while the connection runs are
    /// written in order. A channel can only be driven by one session at a time.
    #[instrument(skip(self, session), fields(exchange = "huobi"))]
    pub async fn run_channel<S: WsSession>(
        &self,
        channel: HuobiChannel,
        mut session: S,
    ) -> Result<(), ExchangeError> {
        let mut outbound = self.outbound_rx.lock().remove(&channel).ok_or_else(|| {
            ExchangeError::Other(format!("Channel {} is already running", channel))
        })?;

        let result = self.drive(channel, &mut session, &mut outbound).await;

        self.outbound_rx.lock().insert(channel, outbound);
        if channel.is_v2() {
            self.authenticated.store(false, Ordering::Release);
        }
        if let Err(e) = session.close().await {
            debug!(error = %e, "Failed to close session");
        }

        result
    }

    async fn drive<S: WsSession>(
        &self,
        channel: HuobiChannel,
        session: &mut S,
        outbound: &mut mpsc::UnboundedReceiver<String>,
    ) -> Result<(), ExchangeError> {
        session.connect().await?;
        info!("Channel connected");

        let ready_handler = self.ready_handler.read().clone();
        if let Some(handler) = ready_handler {
            handler(channel);
        }

        if channel.is_v2() && self.config.has_credentials() {
            session.send_text(self.auth_frame()?).await?;
        }

        loop {
            tokio::select! {
                frame = session.next_frame() => match frame {
                    Some(Ok(payload)) => {
                        if let Some(reply) = self.handle_frame(channel, &payload) {
                            session.send_text(reply).await?;
                        }
                    }
                    Some(Err(e)) => return Err(e),
                    None => {
                        info!("Channel closed");
                        return Ok(());
                    }
                },
                Some(frame) = outbound.recv() => {
                    session.send_text(frame).await?;
                }
            }
        }
    }
}

#[async_trait]
impl<R: RestClient> MarketDataSource for MarketData<R> {
    type Channel = HuobiChannel;

    /// A failed load leaves the previous catalog in place
    #[instrument(skip(self), fields(exchange = "huobi"))]
    async fn load_symbols(&self) -> Result<usize, ExchangeError> {
        let response = self.rest.get_common_symbols().await?;
        let pairs = build_pairs(response)?;
        let catalog = SymbolCatalog::build(&pairs, &self.coins);
        let count = catalog.len() - 1;

        *self.catalog.write() = Arc::new(catalog);
        info!(count, "Loaded symbol catalog");
        Ok(count)
    }

    fn subscribe_price_book_ticker(
        &self,
        channel: HuobiChannel,
        symbol: SymbolId,
        handler: PriceBookTickerHandler,
    ) -> Result<(), ExchangeError> {
        if channel != HuobiChannel::Public {
            return Err(ExchangeError::ChannelMisuse {
                channel: channel.to_string(),
                operation: "subscribe_price_book_ticker",
            });
        }

        let catalog = self.catalog();
        let name = catalog.name(symbol).ok_or_else(|| {
            ExchangeError::InvalidParameters(format!("Symbol {} is not in the catalog", symbol))
        })?;

        let frame =
            HuobiCodec::new(channel).encode_subscription(&price_book_ticker_topic(name))?;

        self.handlers.write().entry(symbol).or_default().push(handler);
        self.enqueue(channel, frame)?;

        debug!(exchange = "huobi", symbol = %name, "Queued bbo subscription");
        Ok(())
    }
}
