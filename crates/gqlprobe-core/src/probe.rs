//! Transport probe contract.
//!
//! The engine never talks to the network itself. It hands an [`HttpRequest`]
//! to an [`HttpTransport`] or asks a [`WebSocketConnector`] for a one-shot
//! connection attempt, and normalizes whatever comes back into a
//! [`ProbeOutcome`] or [`WebSocketOutcome`].
//!
//! Production implementations live in `gqlprobe-transport`; in-memory
//! scripted implementations for tests live in [`crate::fakes`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Probe identity
// ---------------------------------------------------------------------------

/// The probes the orchestrator knows how to run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProbeKind {
    /// One-shot WebSocket open/close.
    WebSocketConnect,

    /// OPTIONS request asking whether a cross-origin POST is allowed.
    Preflight,

    /// POST of a trivial `__typename` query.
    Ping,

    /// POST of the full introspection query.
    Introspection,
}

impl ProbeKind {
    /// Get the probe name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            ProbeKind::WebSocketConnect => "websocket_connect",
            ProbeKind::Preflight => "preflight",
            ProbeKind::Ping => "ping",
            ProbeKind::Introspection => "introspection",
        }
    }
}

impl std::fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// HTTP request / response
// ---------------------------------------------------------------------------

/// Case-insensitive header mapping. Names are stored lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, replacing any previous value for the same name.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.0
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Builder-style [`Headers::insert`].
    pub fn with(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HttpMethod {
    Options,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Post => "POST",
        }
    }
}

/// A single request the engine wants performed.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Headers,

    /// JSON body, sent with `content-type: application/json` when present.
    pub body: Option<serde_json::Value>,
}

/// A completed HTTP exchange, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: String::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

// ---------------------------------------------------------------------------
// Failures and outcomes
// ---------------------------------------------------------------------------

/// Machine-readable transport failure code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    /// Host name did not resolve.
    NameResolution,

    /// Host resolved but nothing accepted the connection.
    ConnectionRefused,

    /// TLS spoken to a plaintext socket or the other way round.
    ProtocolMismatch,

    /// No terminal outcome within the probe bound.
    TimedOut,

    /// Anything the transport could not put a name on.
    Other,
}

/// A transport-level failure, with the raw library error for triage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportFailure {
    pub kind: TransportErrorKind,
    pub raw: String,
}

impl TransportFailure {
    pub fn new(kind: TransportErrorKind, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
        }
    }
}

impl std::fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.raw)
    }
}

/// Errors an [`HttpTransport`] may return.
///
/// Non-2xx statuses are not errors; they come back as an [`HttpResponse`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// Transport-level failure carrying a failure code
    #[error("transport failure: {0}")]
    Transport(TransportFailure),

    /// Anything else raised while running the probe
    #[error("{0}")]
    Unclassified(String),
}

/// Normalized result of one HTTP probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success(HttpResponse),
    TransportFailure(TransportFailure),

    /// Terminal success of a WebSocket probe.
    ConnectionClosed,
}

/// Terminal outcome of a one-shot WebSocket connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebSocketOutcome {
    /// Connection opened and then closed without an error event.
    Closed,

    /// Connection never opened.
    ConnectFailed(TransportFailure),

    /// Connection opened, then an error event fired.
    Errored(TransportFailure),
}

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// HTTP request capability.
///
/// Implementations must not fail on non-2xx statuses.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, ProbeError>;
}

/// WebSocket connection capability.
///
/// Resolves exactly once, after the connection attempt has settled.
#[async_trait]
pub trait WebSocketConnector: Send + Sync {
    async fn connect(&self, url: &str, origin: &str) -> WebSocketOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_case_insensitive() {
        let headers = Headers::new().with("Access-Control-Allow-Origin", "*");
        assert_eq!(headers.get("access-control-allow-origin"), Some("*"));
        assert_eq!(headers.get("ACCESS-CONTROL-ALLOW-ORIGIN"), Some("*"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_headers_insert_replaces() {
        let mut headers = Headers::new();
        headers.insert("Origin", "a");
        headers.insert("origin", "b");
        assert_eq!(headers.get("origin"), Some("b"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_headers_from_iter() {
        let headers: Headers = vec![("X-One", "1"), ("x-two", "2")].into_iter().collect();
        assert_eq!(headers.get("x-one"), Some("1"));
        assert_eq!(headers.get("X-Two"), Some("2"));
    }

    #[test]
    fn test_probe_kind_names() {
        assert_eq!(ProbeKind::WebSocketConnect.name(), "websocket_connect");
        assert_eq!(ProbeKind::Preflight.name(), "preflight");
        assert_eq!(ProbeKind::Ping.name(), "ping");
        assert_eq!(ProbeKind::Introspection.name(), "introspection");
    }

    #[test]
    fn test_probe_error_display() {
        let err = ProbeError::Transport(TransportFailure::new(
            TransportErrorKind::ConnectionRefused,
            "tcp connect error",
        ));
        assert!(err.to_string().contains("ConnectionRefused"));
        assert!(err.to_string().contains("tcp connect error"));
    }
}
