//! HTTP transport for the relay service.
//!
//! # Responsibilities
//! - Build the reqwest client with connect and request deadlines
//! - Resolve paths against the configured base URL (keeping any base path)
//! - Send exact body bytes; nothing is re-serialized here
//! - Retry GETs on transport failure, never POSTs

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use url::Url;

use crate::config::{ApiConfig, RetryConfig};
use crate::observability::metrics;
use crate::relay::error::{RelayError, RelayResult};
use crate::relay::types::ErrorBody;
use crate::resilience::with_retries;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Turn a non-2xx response into [`RelayError::Protocol`].
    pub fn ensure_success(self) -> RelayResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(RelayError::Protocol {
                status: self.status.as_u16(),
                message: ErrorBody::server_message(&self.body),
            })
        }
    }

    /// Decode the body, reporting shape problems as malformed responses.
    pub fn json<T: DeserializeOwned>(&self, path: &str) -> RelayResult<T> {
        serde_json::from_slice(&self.body).map_err(|e| RelayError::MalformedResponse {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Shared HTTP client bound to one relay base URL.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    retries: RetryConfig,
}

impl HttpTransport {
    pub fn new(api: &ApiConfig, retries: &RetryConfig) -> RelayResult<Self> {
        let parsed = Url::parse(&api.base_url)
            .map_err(|e| RelayError::Config(format!("Invalid base URL '{}': {}", api.base_url, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(RelayError::Config(format!("Base URL '{}' cannot carry paths", api.base_url)));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(api.request_timeout_ms))
            .connect_timeout(Duration::from_millis(api.connect_timeout_ms))
            .build()
            .map_err(|e| RelayError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            retries: retries.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Unauthenticated GET, retried on transport failure.
    pub async fn get(&self, path: &str) -> RelayResult<RawResponse> {
        with_retries(&Method::GET, &self.retries, || self.send(Method::GET, path, None, &[])).await
    }

    /// POST `body` verbatim with the given extra headers. Sent exactly once.
    pub async fn post(
        &self,
        path: &str,
        body: Vec<u8>,
        headers: &[(&'static str, String)],
    ) -> RelayResult<RawResponse> {
        self.send(Method::POST, path, Some(body), headers).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        headers: &[(&'static str, String)],
    ) -> RelayResult<RawResponse> {
        let started = Instant::now();

        let mut request = self
            .client
            .request(method.clone(), self.url(path))
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }

        let result = exchange(request).await;

        let elapsed = started.elapsed();
        match &result {
            Ok(response) => {
                tracing::debug!(
                    method = %method,
                    path,
                    status = response.status.as_u16(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Relay request completed"
                );
                metrics::record_request(method.as_str(), &response.status.as_u16().to_string(), elapsed);
            }
            Err(e) => {
                tracing::warn!(
                    method = %method,
                    path,
                    error = %e,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Relay request failed"
                );
                metrics::record_request(method.as_str(), e.kind(), elapsed);
            }
        }

        result
    }
}

async fn exchange(request: reqwest::RequestBuilder) -> RelayResult<RawResponse> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.bytes().await?.to_vec();
    Ok(RawResponse { status, body })
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("max_attempts", &self.retries.max_attempts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        }
    }

    #[test]
    fn test_base_path_is_kept() {
        let transport = HttpTransport::new(&api("http://relay.local/api/"), &RetryConfig::default()).unwrap();
        assert_eq!(transport.url("/v1/tx"), "http://relay.local/api/v1/tx");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpTransport::new(&api("not a url"), &RetryConfig::default()).unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));
    }

    #[test]
    fn test_ensure_success_maps_protocol_error() {
        let response = RawResponse {
            status: StatusCode::BAD_REQUEST,
            body: br#"{"errors": [{"id": "bad_arguments", "message": "bad to"}]}"#.to_vec(),
        };
        match response.ensure_success() {
            Err(RelayError::Protocol { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad to");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_connect_error() {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            request_timeout_ms: 1000,
            connect_timeout_ms: 500,
        };
        let retries = RetryConfig {
            enabled: false,
            ..RetryConfig::default()
        };
        let transport = HttpTransport::new(&config, &retries).unwrap();
        let err = transport.post("/v1/tx", b"{}".to_vec(), &[]).await.unwrap_err();
        assert!(matches!(err, RelayError::Network { connect: true, .. }));
    }
}
