//! CORS analyzer.
//!
//! Both checks look only at response headers, never the body.

use crate::diagnosis::Diagnosis;
use crate::probe::HttpResponse;

pub const ALLOW_METHODS: &str = "access-control-allow-methods";
pub const ALLOW_ORIGIN: &str = "access-control-allow-origin";
pub const ALLOW_CREDENTIALS: &str = "access-control-allow-credentials";

/// Does the preflight response allow a cross-origin POST?
pub fn check_preflight(response: &HttpResponse) -> Option<Diagnosis> {
    let allowed = response
        .headers
        .get(ALLOW_METHODS)
        .map(|value| {
            value
                .split(',')
                .any(|method| method.trim().eq_ignore_ascii_case("POST"))
        })
        .unwrap_or(false);

    if allowed {
        return None;
    }

    let found = match response.headers.get(ALLOW_METHODS) {
        Some(value) => format!("it was '{value}'"),
        None => "the header is missing".to_string(),
    };
    Some(Diagnosis::cors(format!(
        "OPTIONS response does not allow POST: expected '{ALLOW_METHODS}' to include POST, but {found}"
    )))
}

/// Does the actual response let a browser at `origin` read it?
pub fn check_actual_response(response: &HttpResponse, origin: &str) -> Option<Diagnosis> {
    let value = response.headers.get(ALLOW_ORIGIN);
    if matches!(value, Some(v) if v == "*" || v == origin) {
        return None;
    }

    let found = match value {
        Some(v) => format!("POST response has '{ALLOW_ORIGIN}: {v}', which does not allow origin {origin}"),
        None => format!("POST response is missing the '{ALLOW_ORIGIN}' header"),
    };
    Some(Diagnosis::cors(format!(
        "{found}.\n\
         If cookie-based authentication is used, the endpoint must echo the exact origin and allow credentials:\n    \
         {ALLOW_ORIGIN}: {origin}\n    \
         {ALLOW_CREDENTIALS}: true\n\
         Otherwise a wildcard is enough:\n    \
         {ALLOW_ORIGIN}: *"
    )))
}
