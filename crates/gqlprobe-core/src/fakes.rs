//! In-memory fakes for the transport traits (testing only)
//!
//! Provides `ScriptedHttpTransport` and `ScriptedWebSocket`, which answer
//! from a script instead of the network and record every call so tests can
//! assert which probes actually ran.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::probe::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, ProbeError, ProbeKind,
    WebSocketConnector, WebSocketOutcome,
};

/// What a scripted probe does when called.
#[derive(Debug, Clone)]
pub enum Scripted {
    Respond(HttpResponse),
    Fail(ProbeError),

    /// Never resolve; exercises the probe bound.
    Hang,
}

/// Which HTTP probe a request belongs to, judged from its shape.
pub fn probe_of(request: &HttpRequest) -> ProbeKind {
    match request.method {
        HttpMethod::Options => ProbeKind::Preflight,
        HttpMethod::Post => {
            let is_introspection = request
                .body
                .as_ref()
                .and_then(|body| body.get("operationName"))
                .and_then(|name| name.as_str())
                == Some("IntrospectionQuery");
            if is_introspection {
                ProbeKind::Introspection
            } else {
                ProbeKind::Ping
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ScriptedHttpTransport
// ---------------------------------------------------------------------------

/// HTTP transport answering each probe from a fixed script.
#[derive(Debug, Default)]
pub struct ScriptedHttpTransport {
    script: HashMap<ProbeKind, Scripted>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the answer for one probe.
    pub fn on(mut self, probe: ProbeKind, scripted: Scripted) -> Self {
        self.script.insert(probe, scripted);
        self
    }

    pub fn respond(self, probe: ProbeKind, response: HttpResponse) -> Self {
        self.on(probe, Scripted::Respond(response))
    }

    pub fn fail(self, probe: ProbeKind, error: ProbeError) -> Self {
        self.on(probe, Scripted::Fail(error))
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Probes that reached the transport, in order.
    pub fn probes(&self) -> Vec<ProbeKind> {
        self.requests().iter().map(probe_of).collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedHttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ProbeError> {
        let probe = probe_of(&request);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        match self.script.get(&probe).cloned() {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(error)) => Err(error),
            Some(Scripted::Hang) => std::future::pending().await,
            None => Err(ProbeError::Unclassified(format!(
                "no scripted response for probe {probe}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// ScriptedWebSocket
// ---------------------------------------------------------------------------

/// WebSocket connector that settles with a fixed outcome.
#[derive(Debug)]
pub struct ScriptedWebSocket {
    outcome: Option<WebSocketOutcome>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedWebSocket {
    pub fn settles_with(outcome: WebSocketOutcome) -> Self {
        Self {
            outcome: Some(outcome),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A connector whose attempts never settle.
    pub fn hanging() -> Self {
        Self {
            outcome: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(url, origin)` of every connection attempt.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for ScriptedWebSocket {
    fn default() -> Self {
        Self::settles_with(WebSocketOutcome::Closed)
    }
}

#[async_trait]
impl WebSocketConnector for ScriptedWebSocket {
    async fn connect(&self, url: &str, origin: &str) -> WebSocketOutcome {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((url.to_string(), origin.to_string()));

        match &self.outcome {
            Some(outcome) => outcome.clone(),
            None => std::future::pending().await,
        }
    }
}
