use crate::core::errors::ExchangeError;
use crate::core::kernel::Signer;
use crate::core::traits::{OrderPlacer, OrderUpdateHandler};
use crate::core::types::{OrderRequest, OrderResponse};
use crate::exchanges::huobi::connector::market_data::SharedCatalog;
use crate::exchanges::huobi::rest::signed_order_body;
use crate::exchanges::huobi::signer::current_nonce;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Huobi order entry
///
/// Requests are built and signed but not submitted. Order update handlers
/// are stored; the account feed does not carry order status yet.
pub struct Trading {
    catalog: SharedCatalog,
    signer: Option<Arc<dyn Signer>>,
    order_update_handler: RwLock<Option<OrderUpdateHandler>>,
}

impl Trading {
    pub fn new(catalog: SharedCatalog, signer: Option<Arc<dyn Signer>>) -> Self {
        Self {
            catalog,
            signer,
            order_update_handler: RwLock::new(None),
        }
    }

    pub fn has_signer(&self) -> bool {
        self.signer.is_some()
    }

    pub fn order_update_handler(&self) -> Option<OrderUpdateHandler> {
        self.order_update_handler.read().clone()
    }
}

#[async_trait]
impl OrderPlacer for Trading {
    #[instrument(skip(self, order), fields(exchange = "huobi", symbol = %order.symbol, side = ?order.side))]
    async fn place_order(&self, order: OrderRequest) -> Result<OrderResponse, ExchangeError> {
        let catalog = self.catalog.read().clone();
        let name = catalog.name(order.symbol).ok_or_else(|| {
            ExchangeError::InvalidParameters(format!(
                "Symbol {} is not in the catalog",
                order.symbol
            ))
        })?;

        let signer = self.signer.as_ref().ok_or_else(|| {
            ExchangeError::AuthError("Order placement requires API credentials".to_string())
        })?;

        let signed = signed_order_body(signer.as_ref(), name, &order, current_nonce()?)?;
        debug!(body = %signed.body, "Prepared order request");

        Err(ExchangeError::NotSupported(
            "Order submission is not available for Huobi".to_string(),
        ))
    }

    fn subscribe_order_update(&self, handler: OrderUpdateHandler) {
        *self.order_update_handler.write() = Some(handler);
    }
}
