//! Mapping of network library errors onto transport failure codes.
//!
//! Neither reqwest nor tungstenite exposes a stable error taxonomy for DNS
//! or TLS problems, so the source chain is walked: `io::ErrorKind` where the
//! OS reports one, otherwise well-known message fragments.

use std::error::Error as StdError;
use std::io;

use gqlprobe_core::{ProbeError, TransportErrorKind, TransportFailure};

const NAME_RESOLUTION_MARKERS: &[&str] = &[
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "no such host",
    "nodename nor servname",
];

const PROTOCOL_MISMATCH_MARKERS: &[&str] = &[
    "invalidcontenttype",
    "corrupt message",
    "wrong version number",
    "invalid http version",
    "httpformat",
    "invalid status line",
    "http/0.9",
];

/// Render an error and all of its sources as one line.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !rendered.contains(&text) {
            rendered.push_str(": ");
            rendered.push_str(&text);
        }
        source = cause.source();
    }
    rendered
}

/// Decide the failure code for an error chain.
pub fn failure_kind(err: &(dyn StdError + 'static)) -> TransportErrorKind {
    let mut current = Some(err);
    while let Some(cause) = current {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            match io_err.kind() {
                io::ErrorKind::ConnectionRefused => return TransportErrorKind::ConnectionRefused,
                io::ErrorKind::TimedOut => return TransportErrorKind::TimedOut,
                _ => {}
            }
        }
        current = cause.source();
    }

    kind_from_message(&error_chain(err))
}

/// Decide the failure code from an error's rendered text alone.
pub fn kind_from_message(message: &str) -> TransportErrorKind {
    let lowered = message.to_ascii_lowercase();
    if NAME_RESOLUTION_MARKERS.iter().any(|m| lowered.contains(m)) {
        TransportErrorKind::NameResolution
    } else if lowered.contains("connection refused") {
        TransportErrorKind::ConnectionRefused
    } else if PROTOCOL_MISMATCH_MARKERS.iter().any(|m| lowered.contains(m)) {
        TransportErrorKind::ProtocolMismatch
    } else if lowered.contains("timed out") {
        TransportErrorKind::TimedOut
    } else {
        TransportErrorKind::Other
    }
}

/// Build a transport failure from any error chain.
pub fn transport_failure(err: &(dyn StdError + 'static)) -> TransportFailure {
    TransportFailure::new(failure_kind(err), error_chain(err))
}

/// Convert a reqwest error into the probe error the engine expects.
///
/// Request-building errors (bad URL, bad header value) are not network
/// failures and stay unclassified.
pub fn from_reqwest(err: &reqwest::Error) -> ProbeError {
    if err.is_builder() {
        return ProbeError::Unclassified(error_chain(err));
    }

    let mut failure = transport_failure(err);
    if err.is_timeout() {
        failure.kind = TransportErrorKind::TimedOut;
    }
    ProbeError::Transport(failure)
}
