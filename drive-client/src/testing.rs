//! Shared test support: a mock transport and millisecond-scale retry
//! policies so retry paths run fast under test.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use mockall::mock;

use drive_transport::{HttpClient, HttpRequest, HttpResponse};

use crate::retry::{RetryConfig, RetryPolicy};

mock! {
    pub Http {}

    #[async_trait]
    impl HttpClient for Http {
        async fn execute(&self, request: HttpRequest) -> drive_transport::Result<HttpResponse>;
        async fn stream(
            &self,
            request: HttpRequest,
        ) -> drive_transport::Result<Box<dyn tokio::io::AsyncRead + Send + Unpin>>;
    }
}

/// Default attempt counts, but with delays measured in milliseconds.
pub fn fast_retry_config() -> RetryConfig {
    let fast = |attempts: u32| {
        RetryPolicy::new(attempts)
            .with_base_delay(Duration::from_millis(1))
            .with_max_delay(Duration::from_millis(5))
            .with_jitter(false)
    };

    RetryConfig {
        standard: fast(5),
        extended: fast(6),
        download: fast(6),
    }
}

pub fn json_response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: Default::default(),
        body: Bytes::from(body.to_owned()),
    }
}
