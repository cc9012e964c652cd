//! Structured observability for diagnostic runs.
//!
//! - [`init_tracing`] configures the global subscriber for binaries
//! - [`run_span`] scopes every event of a run to its endpoint
//! - `emit_*` functions record probe lifecycle events at `info!`/`debug!`
//!
//! Log lines go to stderr; stdout is reserved for the rendered report.
//! Filtering follows `RUST_LOG` when set.

use tracing::{debug, info, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::probe::ProbeKind;

/// Initialise the global tracing subscriber.
///
/// * `json`: emit newline-delimited JSON log lines.
/// * `level`: default verbosity when `RUST_LOG` is not set.
///
/// Only the first call in a process takes effect.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry.with(layer.json()).try_init().ok();
    } else {
        registry.with(layer).try_init().ok();
    }
}

/// Span that scopes every event of one run to its endpoint.
///
/// Attach with `tracing::Instrument` rather than entering it, since a run
/// awaits across probes.
pub fn run_span(endpoint: &str) -> tracing::Span {
    tracing::info_span!("gqlprobe.run", endpoint = %endpoint)
}

pub fn emit_run_started(endpoint: &str, origin: &str, probes: usize) {
    info!(event = "run.started", endpoint = %endpoint, origin = %origin, probes = probes);
}

pub fn emit_run_finished(endpoint: &str, diagnoses: usize, duration_ms: u64) {
    info!(
        event = "run.finished",
        endpoint = %endpoint,
        diagnoses = diagnoses,
        duration_ms = duration_ms,
    );
}

pub fn emit_probe_started(probe: ProbeKind) {
    debug!(event = "probe.started", probe = %probe);
}

pub fn emit_probe_finished(probe: ProbeKind, diagnoses: usize, duration_ms: u64) {
    info!(
        event = "probe.finished",
        probe = %probe,
        diagnoses = diagnoses,
        duration_ms = duration_ms,
    );
}

pub fn emit_probe_skipped(probe: ProbeKind, reason: &str) {
    info!(event = "probe.skipped", probe = %probe, reason = %reason);
}

/// A probe hit the configured bound.
pub fn emit_probe_timed_out(probe: ProbeKind, limit_ms: u64) {
    tracing::warn!(event = "probe.timed_out", probe = %probe, limit_ms = limit_ms);
}
