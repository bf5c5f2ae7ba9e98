//! HTTP transport implementation using Reqwest
//!
//! Provides the production [`HttpClient`] backed by a pooled `reqwest`
//! client with rustls TLS. Each call performs exactly one attempt; the
//! retry engine above this layer decides whether and when to call again.

use async_trait::async_trait;
use drive_transport::{HttpClient, HttpMethod, HttpRequest, HttpResponse, Result, TransportError};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Reqwest-based HTTP transport
///
/// - Connection pooling and keep-alive via reqwest
/// - TLS by default
/// - Streaming response bodies for downloads
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a new transport with default configuration
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a new transport with a custom default timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .user_agent("drive-client/0.1.0")
            .build()
            .expect("Failed to build HTTP client");

        Self { client }
    }

    /// Create a new transport around a preconfigured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }

    fn convert_error(e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }

    fn build_request(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let method = Self::convert_method(request.method);
        let mut req = self.client.request(method, &request.url);

        for (key, value) in request.headers {
            req = req.header(key, value);
        }

        if let Some(body) = request.body {
            req = req.body(body);
        }

        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        req
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(url = %request.url, method = ?request.method, "executing HTTP request");

        let response = self
            .build_request(request)
            .send()
            .await
            .map_err(Self::convert_error)?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
            .collect();

        let body = response.bytes().await.map_err(Self::convert_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    async fn stream(
        &self,
        request: HttpRequest,
    ) -> Result<Box<dyn tokio::io::AsyncRead + Send + Unpin>> {
        debug!(url = %request.url, "opening HTTP byte stream");

        let response = self
            .build_request(request)
            .send()
            .await
            .map_err(Self::convert_error)?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status { status, body });
        }

        use futures_util::TryStreamExt;
        let stream = response.bytes_stream().map_err(std::io::Error::other);
        let reader = tokio_util::io::StreamReader::new(stream);

        Ok(Box::new(reader))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_transport_creation() {
        let _transport = ReqwestTransport::new();
        // Just verify it constructs
    }

    #[test]
    fn test_method_conversion() {
        assert_eq!(
            ReqwestTransport::convert_method(HttpMethod::Get),
            reqwest::Method::GET
        );
        assert_eq!(
            ReqwestTransport::convert_method(HttpMethod::Patch),
            reqwest::Method::PATCH
        );
        assert_eq!(
            ReqwestTransport::convert_method(HttpMethod::Delete),
            reqwest::Method::DELETE
        );
    }
}
