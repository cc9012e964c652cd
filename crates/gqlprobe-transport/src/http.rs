//! HTTP probe transport backed by reqwest.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Method;
use tracing::debug;

use gqlprobe_core::{
    DoctorConfig, Headers, HttpMethod, HttpRequest, HttpResponse, HttpTransport, ProbeError,
};

use crate::error::Result;
use crate::failure::from_reqwest;

/// Sends probe requests over HTTP(S).
///
/// Any status, including 4xx and 5xx, is returned as a response.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport from the run configuration.
    pub fn new(config: &DoctorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.probe_timeout)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, ProbeError> {
        debug!(
            method = request.method.as_str(),
            url = %request.url,
            "sending probe request"
        );

        let mut builder = self
            .client
            .request(method(request.method), request.url.as_str());
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| from_reqwest(&e))?;
        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let body = response.text().await.map_err(|e| from_reqwest(&e))?;

        debug!(status, body_len = body.len(), "probe response received");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Options => Method::OPTIONS,
        HttpMethod::Post => Method::POST,
    }
}

/// Flatten a header map, joining repeated names with `", "`.
fn collect_headers(map: &HeaderMap) -> Headers {
    let mut headers = Headers::new();
    for (name, value) in map {
        let Ok(value) = value.to_str() else {
            continue;
        };
        let joined = match headers.get(name.as_str()) {
            Some(existing) => format!("{existing}, {value}"),
            None => value.to_string(),
        };
        headers.insert(name.as_str(), joined);
    }
    headers
}
