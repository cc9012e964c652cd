//! One-shot WebSocket probe backed by tokio-tungstenite.
//!
//! Opens a connection with the operator's `Origin`, closes it straight away
//! and waits for the close handshake to finish. No subscription protocol is
//! spoken.

use async_trait::async_trait;
use futures::StreamExt;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::ORIGIN;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Error as WsError;
use tracing::debug;

use gqlprobe_core::{WebSocketConnector, WebSocketOutcome};

use crate::failure::transport_failure;

/// Connects with tungstenite over plain TCP or rustls.
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteConnector;

impl TungsteniteConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WebSocketConnector for TungsteniteConnector {
    async fn connect(&self, url: &str, origin: &str) -> WebSocketOutcome {
        let mut request = match url.into_client_request() {
            Ok(request) => request,
            Err(e) => return WebSocketOutcome::ConnectFailed(transport_failure(&e)),
        };
        match HeaderValue::from_str(origin) {
            Ok(value) => {
                request.headers_mut().insert(ORIGIN, value);
            }
            Err(e) => return WebSocketOutcome::ConnectFailed(transport_failure(&e)),
        }

        let (mut stream, response) = match tokio_tungstenite::connect_async(request).await {
            Ok(connected) => connected,
            Err(e) => {
                debug!(error = %e, "websocket connect failed");
                return WebSocketOutcome::ConnectFailed(transport_failure(&e));
            }
        };
        debug!(status = response.status().as_u16(), "websocket opened");

        if let Err(e) = stream.close(None).await {
            if !is_clean_close(&e) {
                return WebSocketOutcome::Errored(transport_failure(&e));
            }
        }

        while let Some(message) = stream.next().await {
            match message {
                Ok(_) => continue,
                Err(e) if is_clean_close(&e) => break,
                Err(e) => return WebSocketOutcome::Errored(transport_failure(&e)),
            }
        }

        WebSocketOutcome::Closed
    }
}

fn is_clean_close(err: &WsError) -> bool {
    matches!(err, WsError::ConnectionClosed | WsError::AlreadyClosed)
}
