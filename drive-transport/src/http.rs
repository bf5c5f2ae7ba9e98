//! HTTP request and response value types plus the client trait.
//!
//! The types here are deliberately plain: a request is a method, a URL,
//! headers and an optional body. Everything Drive-specific (field masks,
//! query expressions, retry classification) is built by the layer above.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::{Result, TransportError};

/// HTTP method types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// HTTP request builder
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Bytes>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn bearer_token(self, token: impl Into<String>) -> Self {
        self.header("Authorization", format!("Bearer {}", token.into()))
    }

    /// Serialize `body` as JSON and set the content type.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        let json = serde_json::to_vec(body)
            .map_err(|e| TransportError::Request(format!("JSON serialization failed: {}", e)))?;
        self.body = Some(Bytes::from(json));
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        Ok(self)
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }
}

/// HTTP response
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    /// Check if response status is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Async HTTP client trait
///
/// One call issues exactly one network attempt. Implementations must not
/// retry internally: the caller owns the retry budget and needs an accurate
/// attempt count for its backoff decisions.
///
/// # Example
///
/// ```ignore
/// use drive_transport::{HttpClient, HttpRequest, HttpMethod};
///
/// async fn fetch(client: &dyn HttpClient) -> drive_transport::Result<bytes::Bytes> {
///     let request = HttpRequest::new(HttpMethod::Get, "https://api.example.com/data")
///         .bearer_token("token");
///
///     let response = client.execute(request).await?;
///     Ok(response.body)
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and buffer the full response.
    ///
    /// Non-success statuses are returned as a normal `HttpResponse`; only
    /// transport-level faults (connect, timeout, protocol) are errors.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Execute a request and hand back the response body as a byte stream.
    ///
    /// Used for large downloads that must not be buffered in memory. A
    /// non-success status is reported as [`TransportError::Status`] with the
    /// error body already read.
    async fn stream(
        &self,
        request: HttpRequest,
    ) -> Result<Box<dyn tokio::io::AsyncRead + Send + Unpin>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_request_builder() {
        let request = HttpRequest::new(HttpMethod::Get, "https://example.com")
            .header("Accept", "application/json")
            .bearer_token("secret")
            .timeout(Duration::from_secs(30));

        assert_eq!(request.url, "https://example.com");
        assert_eq!(
            request.headers.get("Accept"),
            Some(&"application/json".to_string())
        );
        assert_eq!(
            request.headers.get("Authorization"),
            Some(&"Bearer secret".to_string())
        );
        assert_eq!(request.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_json_body_sets_content_type() {
        let request = HttpRequest::new(HttpMethod::Post, "https://example.com")
            .json(&serde_json::json!({ "name": "report.txt" }))
            .unwrap();

        assert_eq!(
            request.headers.get("Content-Type"),
            Some(&"application/json".to_string())
        );
        assert!(request.body.is_some());
    }

    #[test]
    fn test_http_response_success_check() {
        let response = HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: Bytes::from("test"),
        };
        assert!(response.is_success());

        let forbidden = HttpResponse {
            status: 403,
            headers: HashMap::new(),
            body: Bytes::new(),
        };
        assert!(!forbidden.is_success());
    }
}
