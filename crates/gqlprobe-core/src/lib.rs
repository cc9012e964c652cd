//! gqlprobe core - diagnostic decision engine
//!
//! Explains why a GraphQL endpoint fails from a browser:
//! - Runs an ordered probe plan (preflight, ping, introspection, or a
//!   single WebSocket connect)
//! - Classifies statuses and transport failures
//! - Checks CORS headers and validates the introspected schema
//! - Collects findings into a report and renders it

pub mod classify;
pub mod config;
pub mod cors;
pub mod diagnosis;
pub mod doctor;
pub mod endpoint;
pub mod error;
pub mod fakes;
pub mod obs;
pub mod plan;
pub mod probe;
pub mod reporter;
pub mod schema;

// Re-export key types
pub use classify::{classify, classify_failure, classify_status, classify_websocket};
pub use config::DoctorConfig;
pub use cors::{check_actual_response, check_preflight};
pub use diagnosis::{Category, Diagnosis, Report, ReportBuilder};
pub use doctor::Doctor;
pub use endpoint::{Endpoint, TransportKind, DEFAULT_ORIGIN};
pub use error::{DoctorError, Result};
pub use obs::init_tracing;
pub use plan::{ProbePlan, ProbeStep, StepGate};
pub use probe::{
    Headers, HttpMethod, HttpRequest, HttpResponse, HttpTransport, ProbeError, ProbeKind,
    ProbeOutcome, TransportErrorKind, TransportFailure, WebSocketConnector, WebSocketOutcome,
};
pub use reporter::{render_json, render_lines, render_text, ReportLine};
