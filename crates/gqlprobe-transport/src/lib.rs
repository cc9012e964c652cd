//! gqlprobe transport - network implementations of the probe traits
//!
//! - [`ReqwestTransport`] performs HTTP probes with reqwest (rustls)
//! - [`TungsteniteConnector`] performs the one-shot WebSocket probe
//!
//! Library errors are mapped onto transport failure codes in [`failure`].

pub mod error;
pub mod failure;
pub mod http;
pub mod websocket;

pub use error::{Result, TransportError};
pub use http::ReqwestTransport;
pub use websocket::TungsteniteConnector;
