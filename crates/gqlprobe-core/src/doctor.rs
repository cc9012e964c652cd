//! Diagnostic orchestrator.
//!
//! Walks the [`ProbePlan`] for an endpoint one probe at a time, feeds each
//! outcome to the classifier, CORS analyzer, or schema validator, and
//! appends whatever they find to the run's report.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::Instrument;

use crate::classify::{classify, classify_websocket, unclassified};
use crate::config::DoctorConfig;
use crate::cors::{check_actual_response, check_preflight};
use crate::diagnosis::{Diagnosis, Report, ReportBuilder};
use crate::endpoint::Endpoint;
use crate::obs::{
    emit_probe_finished, emit_probe_skipped, emit_probe_started, emit_probe_timed_out,
    emit_run_finished, emit_run_started, run_span,
};
use crate::plan::ProbePlan;
use crate::probe::{
    Headers, HttpMethod, HttpRequest, HttpTransport, ProbeError, ProbeKind, ProbeOutcome,
    TransportErrorKind, TransportFailure, WebSocketConnector, WebSocketOutcome,
};
use crate::schema;

pub const REQUEST_METHOD_HEADER: &str = "access-control-request-method";
pub const ORIGIN_HEADER: &str = "origin";

/// Runs diagnostic probes against endpoints.
pub struct Doctor {
    http: Arc<dyn HttpTransport>,
    websocket: Arc<dyn WebSocketConnector>,
    config: DoctorConfig,
}

impl Doctor {
    pub fn new(
        http: Arc<dyn HttpTransport>,
        websocket: Arc<dyn WebSocketConnector>,
        config: DoctorConfig,
    ) -> Self {
        Self {
            http,
            websocket,
            config,
        }
    }

    pub fn config(&self) -> &DoctorConfig {
        &self.config
    }

    /// Diagnose `endpoint` as seen from a browser at `origin`.
    ///
    /// Probes run strictly in plan order. Every probe error becomes a
    /// diagnosis; nothing here fails the run.
    pub async fn run(&self, endpoint: &Endpoint, origin: &str) -> Report {
        self.run_plan(endpoint, origin)
            .instrument(run_span(endpoint.url()))
            .await
    }

    async fn run_plan(&self, endpoint: &Endpoint, origin: &str) -> Report {
        let start = Instant::now();
        let plan = ProbePlan::for_endpoint(endpoint);
        emit_run_started(endpoint.url(), origin, plan.steps().len());

        let mut report = ReportBuilder::new();
        for step in plan.steps() {
            if !step.gate.permits(report.has_problem()) {
                emit_probe_skipped(step.probe, step.gate.skip_reason());
                continue;
            }

            emit_probe_started(step.probe);
            let probe_start = Instant::now();
            let found = self.execute(step.probe, endpoint, origin).await;
            emit_probe_finished(step.probe, found.len(), elapsed_ms(probe_start));

            report.extend(found.into_iter().map(|d| d.from_probe(step.probe)));
        }

        let report = report.finish();
        emit_run_finished(endpoint.url(), report.diagnoses().len(), elapsed_ms(start));
        report
    }

    async fn execute(&self, probe: ProbeKind, endpoint: &Endpoint, origin: &str) -> Vec<Diagnosis> {
        let outcome = match probe {
            ProbeKind::WebSocketConnect => return self.probe_websocket(endpoint, origin).await,
            ProbeKind::Preflight => {
                let request = HttpRequest {
                    method: HttpMethod::Options,
                    url: endpoint.url().to_string(),
                    headers: Headers::new()
                        .with(REQUEST_METHOD_HEADER, "POST")
                        .with(ORIGIN_HEADER, origin),
                    body: None,
                };
                self.send(probe, request).await
            }
            ProbeKind::Ping => {
                self.send(probe, post(endpoint, origin, schema::ping_request_body()))
                    .await
            }
            ProbeKind::Introspection => {
                let body = schema::introspection_request_body();
                self.send(probe, post(endpoint, origin, body)).await
            }
        };

        match outcome {
            Ok(outcome) => analyse(probe, &outcome, origin),
            Err(diagnosis) => vec![diagnosis],
        }
    }

    /// Send one request within the probe bound.
    ///
    /// Completed exchanges and transport failures come back as outcomes;
    /// an error the transport could not classify is already a diagnosis.
    async fn send(&self, probe: ProbeKind, request: HttpRequest) -> Result<ProbeOutcome, Diagnosis> {
        let limit = self.config.probe_timeout;
        match tokio::time::timeout(limit, self.http.send(request)).await {
            Ok(Ok(response)) => {
                tracing::debug!(probe = %probe, status = response.status, "response received");
                Ok(ProbeOutcome::Success(response))
            }
            Ok(Err(ProbeError::Transport(failure))) => Ok(ProbeOutcome::TransportFailure(failure)),
            Ok(Err(ProbeError::Unclassified(raw))) => Err(unclassified(&raw)),
            Err(_) => {
                emit_probe_timed_out(probe, duration_ms(limit));
                Ok(ProbeOutcome::TransportFailure(timed_out(limit)))
            }
        }
    }

    async fn probe_websocket(&self, endpoint: &Endpoint, origin: &str) -> Vec<Diagnosis> {
        let limit = self.config.probe_timeout;
        let outcome =
            match tokio::time::timeout(limit, self.websocket.connect(endpoint.url(), origin)).await
            {
                Ok(outcome) => outcome,
                Err(_) => {
                    emit_probe_timed_out(ProbeKind::WebSocketConnect, duration_ms(limit));
                    WebSocketOutcome::ConnectFailed(timed_out(limit))
                }
            };

        match outcome {
            WebSocketOutcome::Closed => {
                analyse(ProbeKind::WebSocketConnect, &ProbeOutcome::ConnectionClosed, origin)
            }
            WebSocketOutcome::ConnectFailed(failure) | WebSocketOutcome::Errored(failure) => {
                vec![classify_websocket(&failure)]
            }
        }
    }
}

/// Findings for one settled probe outcome.
///
/// Status and CORS rules both run on the same response, so a 401 without
/// CORS headers yields two diagnoses. The introspection body goes to the
/// schema validator only.
fn analyse(probe: ProbeKind, outcome: &ProbeOutcome, origin: &str) -> Vec<Diagnosis> {
    let ProbeOutcome::Success(response) = outcome else {
        return classify(outcome).into_iter().collect();
    };

    match probe {
        ProbeKind::Preflight => [classify(outcome), check_preflight(response)]
            .into_iter()
            .flatten()
            .collect(),
        ProbeKind::Ping => [classify(outcome), check_actual_response(response, origin)]
            .into_iter()
            .flatten()
            .collect(),
        ProbeKind::Introspection => schema::validate(&response.body).into_iter().collect(),
        ProbeKind::WebSocketConnect => classify(outcome).into_iter().collect(),
    }
}

fn post(endpoint: &Endpoint, origin: &str, body: serde_json::Value) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Post,
        url: endpoint.url().to_string(),
        headers: Headers::new().with(ORIGIN_HEADER, origin),
        body: Some(body),
    }
}

fn timed_out(limit: Duration) -> TransportFailure {
    TransportFailure::new(
        TransportErrorKind::TimedOut,
        format!("no terminal outcome within {}s", limit.as_secs_f64()),
    )
}

fn elapsed_ms(start: Instant) -> u64 {
    duration_ms(start.elapsed())
}

fn duration_ms(duration: Duration) -> u64 {
    duration.as_millis() as u64
}
