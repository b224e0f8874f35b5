use crate::core::errors::ExchangeError;

/// Codec trait for exchange-specific WebSocket frame encoding/decoding
///
/// A codec is bound to one logical channel of an exchange: it knows how that
/// channel wraps its payloads (compression, protocol version) and turns raw
/// frame bytes into typed messages.
pub trait WsCodec: Send + Sync + 'static {
    /// The type representing parsed messages from this channel
    type Message: Send + Sync;

    /// Encode a subscription request for one topic
    ///
    /// # Returns
    /// The text frame to send, or an error if the channel has no subscribe
    /// grammar
    fn encode_subscription(&self, topic: &str) -> Result<String, ExchangeError>;

    /// Decode the payload of one data frame
    ///
    /// Control frames (ping, pong, close) never reach the codec; they are
    /// handled at the transport level.
    fn decode_message(&self, payload: &[u8]) -> Result<Self::Message, ExchangeError>;
}
