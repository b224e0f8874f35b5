use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use huobi_adapter::core::kernel::{RestClient, WsSession};
use huobi_adapter::exchanges::huobi::{HuobiBuilder, HuobiChannel, HuobiConnector};
use huobi_adapter::{
    ExchangeConfig, ExchangeError, MarketDataSource, OrderPlacer, OrderRequest, OrderSide,
    OrderUpdate, PriceBookTicker, SymbolId,
};
use serde_json::Value;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};

const SYMBOLS: &str = r#"{"status":"ok","data":[
    {"sc":"btcusdt","bc":"btc","qc":"usdt","state":"online"},
    {"sc":"xrpbtc","bc":"xrp","qc":"btc","state":"offline"},
    {"sc":"ethusdt","bc":"eth","qc":"usdt","state":"online"},
    {"sc":"trxusdt","bc":"trx","qc":"usdt","state":"online"}
]}"#;

const BTC_BBO: &str = r#"{"ch":"market.btcusdt.bbo","ts":1,"tick":{"symbol":"btcusdt","ask":"100.5","askSize":"2","bid":"100.1","bidSize":"3"}}"#;

/// REST client answering every GET with a fixed body
struct FakeRest {
    body: Mutex<String>,
}

impl FakeRest {
    fn new(body: &str) -> Self {
        Self {
            body: Mutex::new(body.to_string()),
        }
    }
}

#[async_trait]
impl RestClient for FakeRest {
    async fn get_text(
        &self,
        _endpoint: &str,
        _query_params: &[(&str, &str)],
    ) -> Result<String, ExchangeError> {
        Ok(self.body.lock().unwrap().clone())
    }
}

/// WebSocket session fed from a channel, recording everything written
struct ScriptedSession {
    inbound: mpsc::UnboundedReceiver<Vec<u8>>,
    sent: Arc<Mutex<Vec<String>>>,
    connected: bool,
}

fn scripted_session() -> (
    ScriptedSession,
    mpsc::UnboundedSender<Vec<u8>>,
    Arc<Mutex<Vec<String>>>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let sent = Arc::new(Mutex::new(Vec::new()));
    let session = ScriptedSession {
        inbound: rx,
        sent: sent.clone(),
        connected: false,
    };
    (session, tx, sent)
}

#[async_trait]
impl WsSession for ScriptedSession {
    async fn connect(&mut self) -> Result<(), ExchangeError> {
        self.connected = true;
        Ok(())
    }

    async fn send_text(&mut self, text: String) -> Result<(), ExchangeError> {
        self.sent.lock().unwrap().push(text);
        Ok(())
    }

    async fn next_frame(&mut self) -> Option<Result<Vec<u8>, ExchangeError>> {
        self.inbound.recv().await.map(Ok)
    }

    async fn close(&mut self) -> Result<(), ExchangeError> {
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

fn gzip(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

fn connector(config: ExchangeConfig) -> Arc<HuobiConnector<FakeRest>> {
    Arc::new(HuobiBuilder::new(config).build_with_rest(FakeRest::new(SYMBOLS)))
}

fn credentials() -> ExchangeConfig {
    ExchangeConfig::new("test-key".to_string(), "test-secret".to_string())
}

fn recorder() -> (
    Arc<dyn Fn(&PriceBookTicker) + Send + Sync>,
    Arc<Mutex<Vec<PriceBookTicker>>>,
) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let handler: Arc<dyn Fn(&PriceBookTicker) + Send + Sync> =
        Arc::new(move |ticker: &PriceBookTicker| {
            sink.lock().unwrap().push(ticker.clone());
        });
    (handler, seen)
}

async fn wait_for(condition: impl Fn() -> bool) {
    timeout(Duration::from_secs(5), async {
        while !condition() {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn test_load_symbols_builds_catalog() {
    let connector = connector(ExchangeConfig::read_only());

    let count = connector.load_symbols().await.unwrap();
    assert_eq!(count, 3);

    let catalog = connector.catalog();
    assert_eq!(catalog.len(), 4);
    assert_eq!(catalog.lookup("btcusdt"), Some(SymbolId(1)));
    assert_eq!(catalog.lookup("ethusdt"), Some(SymbolId(2)));
    assert_eq!(catalog.lookup("trxusdt"), Some(SymbolId(3)));
    assert_eq!(catalog.lookup("xrpbtc"), None);
}

#[tokio::test]
async fn test_failed_load_keeps_previous_catalog() {
    let connector = connector(ExchangeConfig::read_only());
    connector.load_symbols().await.unwrap();

    *connector_rest_body(&connector) = r#"{"status":"error","err-msg":"maintenance"}"#.to_string();
    let result = connector.load_symbols().await;

    assert!(matches!(result, Err(ExchangeError::ApiError { .. })));
    assert_eq!(connector.catalog().len(), 4);
}

fn connector_rest_body(
    connector: &HuobiConnector<FakeRest>,
) -> std::sync::MutexGuard<'_, String> {
    connector.market.rest().rest_client().body.lock().unwrap()
}

#[tokio::test]
async fn test_gzipped_ping_gets_pong() {
    let connector = connector(ExchangeConfig::read_only());

    let reply = connector.handle_frame(HuobiChannel::Public, &gzip(r#"{"ping":1492420473027}"#));
    assert_eq!(reply.as_deref(), Some(r#"{"pong":1492420473027}"#));

    let reply = connector.handle_frame(
        HuobiChannel::V2,
        br#"{"action":"ping","data":{"ts":1492420473027}}"#,
    );
    assert_eq!(
        reply.as_deref(),
        Some(r#"{"action":"pong","data":{"ts":1492420473027}}"#)
    );
}

#[tokio::test]
async fn test_bad_frames_are_dropped() {
    let connector = connector(ExchangeConfig::read_only());

    assert_eq!(connector.handle_frame(HuobiChannel::Public, b"not gzip"), None);
    assert_eq!(connector.handle_frame(HuobiChannel::Public, &gzip("{oops")), None);
    assert_eq!(connector.handle_frame(HuobiChannel::V2, b"[]"), None);
    assert_eq!(
        connector.handle_frame(HuobiChannel::Feed, &gzip(r#"{"status":"ok"}"#)),
        None
    );
}

#[tokio::test]
async fn test_ticker_reaches_handlers_in_registration_order() {
    let connector = connector(ExchangeConfig::read_only());
    connector.load_symbols().await.unwrap();

    let order = Arc::new(Mutex::new(Vec::new()));
    for label in ["first", "second"] {
        let order = order.clone();
        connector
            .subscribe_price_book_ticker(
                HuobiChannel::Public,
                SymbolId(1),
                Arc::new(move |_ticker: &PriceBookTicker| order.lock().unwrap().push(label)),
            )
            .unwrap();
    }
    let (handler, seen) = recorder();
    connector
        .subscribe_price_book_ticker(HuobiChannel::Public, SymbolId(1), handler)
        .unwrap();

    assert_eq!(connector.handle_frame(HuobiChannel::Public, &gzip(BTC_BBO)), None);

    assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].symbol, SymbolId(1));
    assert_eq!(seen[0].ask_price.to_string(), "100.5");
    assert_eq!(seen[0].ask_quantity.to_string(), "2");
    assert_eq!(seen[0].bid_price.to_string(), "100.1");
    assert_eq!(seen[0].bid_quantity.to_string(), "3");
}

#[tokio::test]
async fn test_ticker_for_unknown_or_unsubscribed_symbol_is_ignored() {
    let connector = connector(ExchangeConfig::read_only());
    connector.load_symbols().await.unwrap();

    let (handler, seen) = recorder();
    connector
        .subscribe_price_book_ticker(HuobiChannel::Public, SymbolId(2), handler)
        .unwrap();

    let unknown = BTC_BBO.replace("btcusdt", "dogeusdt");
    connector.handle_frame(HuobiChannel::Public, &gzip(&unknown));
    connector.handle_frame(HuobiChannel::Public, &gzip(BTC_BBO));

    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_subscribe_on_non_public_channel_is_rejected() {
    let connector = connector(ExchangeConfig::read_only());
    connector.load_symbols().await.unwrap();

    for channel in [HuobiChannel::Feed, HuobiChannel::V2] {
        let (handler, seen) = recorder();
        let result = connector.subscribe_price_book_ticker(channel, SymbolId(1), handler);
        assert!(matches!(
            result,
            Err(ExchangeError::ChannelMisuse {
                operation: "subscribe_price_book_ticker",
                ..
            })
        ));

        connector.handle_frame(HuobiChannel::Public, &gzip(BTC_BBO));
        assert!(seen.lock().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_subscribe_requires_loaded_symbol() {
    let connector = connector(ExchangeConfig::read_only());
    let (handler, _seen) = recorder();

    let result =
        connector.subscribe_price_book_ticker(HuobiChannel::Public, SymbolId(1), handler.clone());
    assert!(matches!(result, Err(ExchangeError::InvalidParameters(_))));

    connector.load_symbols().await.unwrap();
    let result =
        connector.subscribe_price_book_ticker(HuobiChannel::Public, SymbolId::UNDEFINED, handler);
    assert!(matches!(result, Err(ExchangeError::InvalidParameters(_))));
}

#[tokio::test]
async fn test_run_channel_survives_malformed_frame() {
    let connector = connector(ExchangeConfig::read_only());
    connector.load_symbols().await.unwrap();

    let (handler, seen) = recorder();
    connector
        .subscribe_price_book_ticker(HuobiChannel::Public, SymbolId(1), handler)
        .unwrap();

    let (session, inbound, sent) = scripted_session();
    let task = {
        let connector = connector.clone();
        tokio::spawn(async move { connector.run_channel(HuobiChannel::Public, session).await })
    };

    inbound.send(gzip(BTC_BBO)).unwrap();
    inbound.send(b"corrupt".to_vec()).unwrap();
    inbound.send(gzip(r#"{"ch":"market.btcusdt.bbo","tick":{"symbol":"btcusdt"}}"#)).unwrap();
    inbound.send(gzip(&BTC_BBO.replace("100.5", "101"))).unwrap();
    inbound.send(gzip(r#"{"ping":42}"#)).unwrap();

    {
        let seen = seen.clone();
        wait_for(move || seen.lock().unwrap().len() == 2).await;
    }
    {
        let sent = sent.clone();
        wait_for(move || {
            let sent = sent.lock().unwrap();
            sent.iter().any(|frame| frame == r#"{"pong":42}"#)
                && sent.iter().any(|frame| frame.contains("market.btcusdt.bbo"))
        })
        .await;
    }

    drop(inbound);
    task.await.unwrap().unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].ask_price.to_string(), "100.5");
    assert_eq!(seen[1].ask_price.to_string(), "101");

    let subscribe: Value = sent
        .lock()
        .unwrap()
        .iter()
        .find(|frame| frame.contains("\"sub\""))
        .map(|frame| serde_json::from_str(frame).unwrap())
        .unwrap();
    assert_eq!(subscribe["sub"], "market.btcusdt.bbo");
    assert!(subscribe["id"].is_string());
}

#[tokio::test]
async fn test_v2_channel_authenticates_on_connect() {
    let connector = connector(credentials());

    let ready = Arc::new(Mutex::new(Vec::<HuobiChannel>::new()));
    {
        let ready = ready.clone();
        connector.set_ready_handler(Arc::new(move |channel: HuobiChannel| {
            ready.lock().unwrap().push(channel);
        }));
    }

    let (session, inbound, sent) = scripted_session();
    let task = {
        let connector = connector.clone();
        tokio::spawn(async move { connector.run_channel(HuobiChannel::V2, session).await })
    };

    {
        let sent = sent.clone();
        wait_for(move || !sent.lock().unwrap().is_empty()).await;
    }
    let auth: Value = serde_json::from_str(&sent.lock().unwrap()[0]).unwrap();
    assert_eq!(auth["action"], "req");
    assert_eq!(auth["ch"], "auth");
    assert_eq!(auth["params"]["accessKey"], "test-key");
    assert_eq!(*ready.lock().unwrap(), vec![HuobiChannel::V2]);

    assert!(!connector.is_authenticated());
    inbound
        .send(br#"{"action":"req","ch":"auth","code":200,"data":{}}"#.to_vec())
        .unwrap();
    {
        let connector = connector.clone();
        wait_for(move || connector.is_authenticated()).await;
    }

    inbound
        .send(br#"{"action":"ping","data":{"ts":7}}"#.to_vec())
        .unwrap();
    {
        let sent = sent.clone();
        wait_for(move || {
            sent.lock()
                .unwrap()
                .iter()
                .any(|frame| frame == r#"{"action":"pong","data":{"ts":7}}"#)
        })
        .await;
    }

    drop(inbound);
    task.await.unwrap().unwrap();
    assert!(!connector.is_authenticated());
}

#[tokio::test]
async fn test_rejected_auth_is_recorded() {
    let connector = connector(credentials());
    connector.handle_frame(
        HuobiChannel::V2,
        br#"{"action":"req","ch":"auth","code":2002}"#,
    );
    assert!(!connector.is_authenticated());
}

#[tokio::test]
async fn test_authenticate_requires_credentials() {
    let connector = connector(ExchangeConfig::read_only());
    assert!(matches!(
        connector.authenticate(),
        Err(ExchangeError::AuthError(_))
    ));

    let connector = self::connector(credentials());
    assert!(connector.authenticate().is_ok());
}

#[tokio::test]
async fn test_channel_cannot_run_twice() {
    let connector = connector(ExchangeConfig::read_only());

    let (first, inbound, _sent) = scripted_session();
    let task = {
        let connector = connector.clone();
        tokio::spawn(async move { connector.run_channel(HuobiChannel::Feed, first).await })
    };
    sleep(Duration::from_millis(20)).await;

    let (second, _inbound2, _sent2) = scripted_session();
    let result = connector.run_channel(HuobiChannel::Feed, second).await;
    assert!(matches!(result, Err(ExchangeError::Other(_))));

    drop(inbound);
    task.await.unwrap().unwrap();

    // the queue is handed back once the first session ends
    let (third, inbound3, _sent3) = scripted_session();
    drop(inbound3);
    connector.run_channel(HuobiChannel::Feed, third).await.unwrap();
}

#[tokio::test]
async fn test_place_order_is_not_supported() {
    let order = OrderRequest {
        symbol: SymbolId(1),
        side: OrderSide::Buy,
        price: "100.5".parse().unwrap(),
        quantity: "1".parse().unwrap(),
    };

    let connector = connector(credentials());
    connector.load_symbols().await.unwrap();
    assert!(matches!(
        connector.place_order(order.clone()).await,
        Err(ExchangeError::NotSupported(_))
    ));

    let read_only = self::connector(ExchangeConfig::read_only());
    read_only.load_symbols().await.unwrap();
    assert!(matches!(
        read_only.place_order(order).await,
        Err(ExchangeError::AuthError(_))
    ));
}

#[tokio::test]
async fn test_order_update_handler_is_stored_and_replaced() {
    let connector = connector(credentials());
    assert!(connector.trading.order_update_handler().is_none());

    let calls = Arc::new(Mutex::new(Vec::new()));
    for label in ["first", "second"] {
        let calls = calls.clone();
        connector.subscribe_order_update(Arc::new(move |update: &OrderUpdate| {
            calls.lock().unwrap().push((label, update.order_id.clone()));
        }));
    }

    // account pushes are not translated into order updates
    let push = br#"{"action":"push","ch":"accounts.update#1","data":{"currency":"btc"}}"#;
    assert_eq!(connector.handle_frame(HuobiChannel::V2, push), None);
    assert!(calls.lock().unwrap().is_empty());

    let handler = connector.trading.order_update_handler().unwrap();
    handler(&OrderUpdate {
        order_id: "31226040".to_string(),
    });
    assert_eq!(
        *calls.lock().unwrap(),
        vec![("second", "31226040".to_string())]
    );
}
