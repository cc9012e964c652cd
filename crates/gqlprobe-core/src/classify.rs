//! Error classifier: turns statuses and transport failures into diagnoses.

use crate::diagnosis::Diagnosis;
use crate::probe::{ProbeOutcome, TransportErrorKind, TransportFailure};

const UNREACHABLE_HINT: &str = "is the address correct and is the server running?";

/// Classify one probe outcome.
///
/// Pure: the same outcome always yields the same diagnosis. Statuses other
/// than 401/404 and the WebSocket `ConnectionClosed` terminal are not
/// problems on their own.
pub fn classify(outcome: &ProbeOutcome) -> Option<Diagnosis> {
    match outcome {
        ProbeOutcome::Success(response) => classify_status(response.status),
        ProbeOutcome::TransportFailure(failure) => Some(classify_failure(failure)),
        ProbeOutcome::ConnectionClosed => None,
    }
}

/// Status-code rules.
pub fn classify_status(status: u16) -> Option<Diagnosis> {
    match status {
        401 => Some(Diagnosis::auth(
            "response returned 401; are authorization headers or cookies required?",
        )),
        404 => Some(Diagnosis::not_found(
            "response returned 404; is the url correct? Are authorization headers or cookies required?",
        )),
        _ => None,
    }
}

/// Transport-failure rules.
///
/// Unrecognised failures are not dropped: they surface as an Unknown
/// diagnosis carrying the raw error and a request to report the case.
pub fn classify_failure(failure: &TransportFailure) -> Diagnosis {
    match unreachable_reason(failure.kind) {
        Some(reason) => Diagnosis::transport(format!(
            "could not reach the endpoint: {reason}; {UNREACHABLE_HINT}"
        )),
        None => unclassified(&failure.raw),
    }
}

/// WebSocket failures are always categorised as Transport.
pub fn classify_websocket(failure: &TransportFailure) -> Diagnosis {
    match unreachable_reason(failure.kind) {
        Some(reason) => Diagnosis::transport(format!(
            "websocket connection failed: {reason}; {UNREACHABLE_HINT}"
        )),
        None => Diagnosis::transport(format!(
            "websocket connection failed: {}; {UNREACHABLE_HINT}",
            failure.raw
        )),
    }
}

/// Unknown diagnosis for an error the classifier has no guidance for.
pub fn unclassified(raw: &str) -> Diagnosis {
    Diagnosis::unknown(format!(
        "unexpected error while probing the endpoint: {raw}\n\
         This failure is not recognised. Please report it, together with the error above, \
         so a specific diagnosis can be added."
    ))
}

fn unreachable_reason(kind: TransportErrorKind) -> Option<&'static str> {
    match kind {
        TransportErrorKind::NameResolution => Some("the host name could not be resolved"),
        TransportErrorKind::ConnectionRefused => Some("the connection was refused"),
        TransportErrorKind::ProtocolMismatch => Some(
            "the server answered with a different protocol (http vs https, or ws vs wss)",
        ),
        TransportErrorKind::TimedOut => {
            Some("no response arrived before the probe timeout; the server may be hung or a proxy may be blocking the request")
        }
        TransportErrorKind::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnosis::Category;
    use crate::probe::HttpResponse;

    fn failure(kind: TransportErrorKind) -> ProbeOutcome {
        ProbeOutcome::TransportFailure(TransportFailure::new(kind, "raw library error"))
    }

    #[test]
    fn test_401_is_auth() {
        let d = classify(&ProbeOutcome::Success(HttpResponse::new(401))).unwrap();
        assert_eq!(d.category, Category::Auth);
        assert!(d.message.contains("401"));
    }

    #[test]
    fn test_404_is_not_found() {
        let d = classify(&ProbeOutcome::Success(HttpResponse::new(404))).unwrap();
        assert_eq!(d.category, Category::NotFound);
        assert!(d.message.contains("is the url correct?"));
    }

    #[test]
    fn test_other_statuses_are_not_problems() {
        for status in [200, 204, 400, 403, 405, 500, 502] {
            assert!(
                classify(&ProbeOutcome::Success(HttpResponse::new(status))).is_none(),
                "status {status}"
            );
        }
    }

    #[test]
    fn test_connection_closed_is_not_a_problem() {
        assert!(classify(&ProbeOutcome::ConnectionClosed).is_none());
    }

    #[test]
    fn test_recognised_failures_are_transport() {
        for kind in [
            TransportErrorKind::NameResolution,
            TransportErrorKind::ConnectionRefused,
            TransportErrorKind::ProtocolMismatch,
            TransportErrorKind::TimedOut,
        ] {
            let d = classify(&failure(kind)).unwrap();
            assert_eq!(d.category, Category::Transport, "{kind:?}");
            assert!(d.message.contains("server running"));
        }
    }

    #[test]
    fn test_other_failure_is_unknown_with_raw_error() {
        let d = classify(&failure(TransportErrorKind::Other)).unwrap();
        assert_eq!(d.category, Category::Unknown);
        assert!(d.message.contains("raw library error"));
        assert!(d.message.contains("Please report"));
    }

    #[test]
    fn test_classify_is_deterministic() {
        let outcomes = vec![
            ProbeOutcome::Success(HttpResponse::new(401)),
            failure(TransportErrorKind::Other),
            ProbeOutcome::Success(HttpResponse::new(200)),
            failure(TransportErrorKind::ConnectionRefused),
        ];
        let forward: Vec<_> = outcomes.iter().map(classify).collect();
        let backward: Vec<_> = outcomes.iter().rev().map(classify).collect();
        let backward: Vec<_> = backward.into_iter().rev().collect();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_websocket_failures_are_always_transport() {
        for kind in [
            TransportErrorKind::ConnectionRefused,
            TransportErrorKind::Other,
        ] {
            let d = classify_websocket(&TransportFailure::new(kind, "boom"));
            assert_eq!(d.category, Category::Transport);
        }
        let d = classify_websocket(&TransportFailure::new(TransportErrorKind::Other, "boom"));
        assert!(d.message.contains("boom"));
    }
}
