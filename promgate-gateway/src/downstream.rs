//! Handoff of translated pushes to the ingestion backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderValue, Method, header};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::debug;

use crate::config::DownstreamConfig;

/// Content type of the Prometheus text exposition format.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Headers that describe the inbound connection or body and are not relayed.
const SKIPPED_HEADERS: [header::HeaderName; 6] = [
    header::HOST,
    header::CONNECTION,
    header::CONTENT_LENGTH,
    header::CONTENT_TYPE,
    header::TRANSFER_ENCODING,
    header::ACCEPT_ENCODING,
];

/// Path parameters matched on the inbound route.
///
/// Each forwarded request owns its own copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingParams(Vec<(String, String)>);

impl RoutingParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((key.into(), value.into()));
        self
    }

    /// Value of the first parameter with the given name.
    pub fn by_name(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A push whose body has been rewritten to exposition text.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    /// Inbound method, relayed unchanged.
    pub method: Method,
    /// Target path (and query) on the downstream.
    pub path: String,
    /// Inbound headers.
    pub headers: HeaderMap,
    /// Inbound routing parameters.
    pub params: RoutingParams,
    /// Rendered exposition text.
    pub body: String,
}

/// Errors raised while handing a request to the downstream.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("Downstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Receiver of translated pushes.
#[async_trait]
pub trait Downstream: Send + Sync {
    /// Handle one translated push and produce the client response.
    async fn forward(&self, request: ForwardRequest) -> Result<Response, ForwardError>;
}

/// Thread-safe reference to a downstream.
pub type SharedDownstream = Arc<dyn Downstream>;

/// Forwards translated pushes to a Pushgateway over HTTP.
pub struct HttpForwarder {
    client: reqwest::Client,
    base_url: String,
}

impl HttpForwarder {
    /// Create a forwarder for the configured downstream.
    pub fn new(config: &DownstreamConfig) -> Result<Self, ForwardError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    /// Full downstream URL for a target path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Downstream for HttpForwarder {
    async fn forward(&self, request: ForwardRequest) -> Result<Response, ForwardError> {
        let url = self.url_for(&request.path);

        let mut headers = forwardable_headers(&request.headers);
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(EXPOSITION_CONTENT_TYPE),
        );

        debug!(
            url = %url,
            method = %request.method,
            bytes = request.body.len(),
            "Forwarding push downstream"
        );

        let response = self
            .client
            .request(request.method, &url)
            .headers(headers)
            .body(request.body)
            .send()
            .await?;

        let status = response.status();
        let mut relayed = HeaderMap::new();
        if let Some(content_type) = response.headers().get(header::CONTENT_TYPE) {
            relayed.insert(header::CONTENT_TYPE, content_type.clone());
        }
        let body = response.bytes().await?;

        debug!(url = %url, status = %status, "Downstream responded");

        Ok((status, relayed, body).into_response())
    }
}

/// Copy inbound headers, minus those tied to the inbound connection or body.
pub fn forwardable_headers(headers: &HeaderMap) -> HeaderMap {
    let mut relayed = headers.clone();
    for name in &SKIPPED_HEADERS {
        relayed.remove(name);
    }
    relayed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_params_lookup() {
        let params = RoutingParams::new().with("job", "batch").with("job", "other");

        assert_eq!(params.by_name("job"), Some("batch"));
        assert_eq!(params.by_name("identify"), None);
        assert_eq!(
            params.iter().collect::<Vec<_>>(),
            vec![("job", "batch"), ("job", "other")]
        );
    }

    #[test]
    fn test_forwardable_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("gateway:9092"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("42"));
        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static("probe/1.0"));
        headers.insert("x-tenant", HeaderValue::from_static("acme"));

        let relayed = forwardable_headers(&headers);

        assert_eq!(relayed.len(), 2);
        assert_eq!(relayed.get(header::USER_AGENT).unwrap(), "probe/1.0");
        assert_eq!(relayed.get("x-tenant").unwrap(), "acme");
    }

    #[test]
    fn test_url_for_trims_base() {
        let config = DownstreamConfig {
            url: "http://pushgateway:9091/".to_string(),
            ..Default::default()
        };
        let forwarder = HttpForwarder::new(&config).unwrap();

        assert_eq!(
            forwarder.url_for("/metrics/job/telecom5"),
            "http://pushgateway:9091/metrics/job/telecom5"
        );
    }
}
