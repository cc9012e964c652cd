//! Report rendering.
//!
//! Two output artifacts:
//! - text lines for a terminal, one warning per diagnosis plus guidance
//! - a JSON document for scripts (`--format json`)

use serde::Serialize;

use crate::diagnosis::{Diagnosis, Report};
use crate::endpoint::{Endpoint, TransportKind};
use crate::error::Result;

pub const WARNING_MARKER: &str = "⚠️";
pub const INFO_MARKER: &str = "ℹ️";

pub const CORS_BYPASS_SUGGESTION: &str = "CORS checks can be avoided entirely by sending requests \
through a local proxy served from the same origin as the client, so the browser never makes a \
cross-origin request.";

pub const NO_PROBLEM_FOUND: &str = "No problems were found with this endpoint. If requests still \
fail from the browser, please report the endpoint and the symptoms so this diagnosis can be improved.";

/// One rendered line of output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportLine {
    Warning(String),
    Info(String),
}

impl std::fmt::Display for ReportLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportLine::Warning(message) => write!(f, "{WARNING_MARKER} {message}"),
            ReportLine::Info(message) => write!(f, "{INFO_MARKER} {message}"),
        }
    }
}

/// Lines to show for a finished report, in display order.
pub fn render_lines(report: &Report) -> Vec<ReportLine> {
    let mut lines: Vec<ReportLine> = report
        .diagnoses()
        .iter()
        .map(|d| ReportLine::Warning(d.message.clone()))
        .collect();

    if report.has_cors_problem() {
        lines.push(ReportLine::Info(CORS_BYPASS_SUGGESTION.to_string()));
    }
    if !report.has_problem() {
        lines.push(ReportLine::Info(NO_PROBLEM_FOUND.to_string()));
    }
    lines
}

/// Full text rendering, newline-terminated.
pub fn render_text(report: &Report) -> String {
    render_lines(report)
        .iter()
        .map(|line| format!("{line}\n"))
        .collect()
}

#[derive(Serialize)]
struct JsonReport<'a> {
    endpoint: &'a str,
    transport: TransportKind,
    origin: &'a str,
    has_problem: bool,
    has_cors_problem: bool,
    diagnoses: &'a [Diagnosis],
}

/// Machine-readable rendering.
pub fn render_json(report: &Report, endpoint: &Endpoint, origin: &str) -> Result<String> {
    let document = JsonReport {
        endpoint: endpoint.url(),
        transport: endpoint.transport_kind(),
        origin,
        has_problem: report.has_problem(),
        has_cors_problem: report.has_cors_problem(),
        diagnoses: report.diagnoses(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}
