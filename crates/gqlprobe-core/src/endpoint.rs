//! Endpoint identity: the URL under diagnosis and the transport it implies.

use serde::{Deserialize, Serialize};

use crate::error::{DoctorError, Result};

/// Origin sent when the operator does not supply one.
pub const DEFAULT_ORIGIN: &str = "https://studio.apollographql.com";

/// Transport family, derived from the URL scheme.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    Http,
    #[serde(rename = "websocket")]
    WebSocket,
}

/// The endpoint being diagnosed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Endpoint {
    url: String,
    transport_kind: TransportKind,
}

impl Endpoint {
    /// Parse an endpoint from operator input.
    ///
    /// `ws://` and `wss://` select the WebSocket transport; anything else is
    /// probed over HTTP.
    pub fn parse(input: &str) -> Result<Self> {
        let url = input.trim();
        if url.is_empty() {
            return Err(DoctorError::InvalidEndpoint(
                "endpoint must not be empty".to_string(),
            ));
        }

        let scheme = url
            .split_once("://")
            .map(|(scheme, _)| scheme.to_ascii_lowercase());
        let transport_kind = match scheme.as_deref() {
            Some("ws") | Some("wss") => TransportKind::WebSocket,
            _ => TransportKind::Http,
        };

        Ok(Self {
            url: url.to_string(),
            transport_kind,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn transport_kind(&self) -> TransportKind {
        self.transport_kind
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_schemes_select_http() {
        let endpoint = Endpoint::parse("https://api.example.com/graphql").unwrap();
        assert_eq!(endpoint.transport_kind(), TransportKind::Http);

        let endpoint = Endpoint::parse("http://localhost:4000/").unwrap();
        assert_eq!(endpoint.transport_kind(), TransportKind::Http);
    }

    #[test]
    fn test_ws_schemes_select_websocket() {
        let endpoint = Endpoint::parse("wss://api.example.com/graphql").unwrap();
        assert_eq!(endpoint.transport_kind(), TransportKind::WebSocket);

        let endpoint = Endpoint::parse("WS://localhost:4000/subscriptions").unwrap();
        assert_eq!(endpoint.transport_kind(), TransportKind::WebSocket);
    }

    #[test]
    fn test_schemeless_input_defaults_to_http() {
        let endpoint = Endpoint::parse("localhost:4000").unwrap();
        assert_eq!(endpoint.transport_kind(), TransportKind::Http);
    }

    #[test]
    fn test_input_is_trimmed() {
        let endpoint = Endpoint::parse("  https://example.com/graphql \n").unwrap();
        assert_eq!(endpoint.url(), "https://example.com/graphql");
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = Endpoint::parse("   ").unwrap_err();
        assert!(matches!(err, DoctorError::InvalidEndpoint(_)));
    }
}
