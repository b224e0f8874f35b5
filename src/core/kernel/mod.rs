//! Exchange-agnostic transport layer
//!
//! The kernel holds only transport logic and the seams exchange adapters plug
//! into:
//!
//! - `RestClient`: HTTP primitive, with `ReqwestRest` as the production client
//! - `WsSession`: WebSocket transport, with `TungsteniteWs` as the production session
//! - `Signer`: request authentication
//! - `WsCodec`: per-channel frame decoding and subscription encoding
//!
//! Nothing in here knows about a particular exchange.

pub mod codec;
pub mod rest;
pub mod signer;
pub mod ws;

pub use codec::WsCodec;
pub use rest::{ReqwestRest, RestClient, RestClientConfig};
pub use signer::{SignedRequest, Signer};
pub use ws::{TungsteniteWs, WsConfig, WsSession};
