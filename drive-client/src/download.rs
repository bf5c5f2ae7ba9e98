//! Stream-based file download
//!
//! Pipes a file's content stream into a local destination. One retry budget
//! covers both fault points of an attempt - issuing the stream request and
//! piping the bytes - because both represent the same logical attempt. Every
//! attempt starts over: the destination is reopened and truncated, the
//! request reissued. There is no partial-byte resume.

use std::path::Path;
use std::time::Duration;

use futures::FutureExt;
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};

use drive_transport::{HttpMethod, HttpRequest, TransportError};

use crate::client::{DriveClient, DRIVE_API_BASE};
use crate::error::{self, Result};
use crate::retry::{classify_permission_guarded, execute_with_retry};

/// Per-attempt timeout for streaming requests
const STREAM_TIMEOUT: Duration = Duration::from_secs(60);

impl DriveClient {
    /// Download a file's content to `dest`, creating or truncating it.
    ///
    /// Transient faults at either the request or the stream level re-run the
    /// whole attempt under the download retry policy; fatal faults reject
    /// the operation with the underlying error.
    #[instrument(skip(self), fields(file_id = %file_id, path = %dest.display()))]
    pub async fn download(&self, file_id: &str, dest: &Path) -> Result<()> {
        let url = format!("{}/files/{}?alt=media", DRIVE_API_BASE, file_id);

        execute_with_retry(&self.retries.download, classify_permission_guarded, |_| {
            let request = HttpRequest::new(HttpMethod::Get, url.clone())
                .bearer_token(self.access_token.as_str())
                .timeout(STREAM_TIMEOUT);
            async move { self.download_attempt(request, dest).await }.boxed()
        })
        .await?;

        info!(path = %dest.display(), "saved download");
        Ok(())
    }

    /// One complete attempt: reopen the destination, issue the stream
    /// request, pipe to disk, flush.
    async fn download_attempt(&self, request: HttpRequest, dest: &Path) -> Result<()> {
        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(TransportError::Io)?;

        let mut reader = match self.http.stream(request).await {
            Ok(reader) => reader,
            // A refused stream carries the API error body; surface it as an
            // API error so classification sees the status and message.
            Err(TransportError::Status { status, body }) => {
                return Err(error::api_error(status, body.as_bytes()))
            }
            Err(err) => return Err(err.into()),
        };

        tokio::io::copy(&mut reader, &mut file)
            .await
            .map_err(TransportError::Io)?;
        file.flush().await.map_err(TransportError::Io)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DriveError, INSUFFICIENT_PERMISSIONS_MESSAGE};
    use crate::testing::{fast_retry_config, MockHttp};
    use std::io::Cursor;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncRead, ReadBuf};

    /// Yields a few bytes, then fails with a transport-style IO error.
    struct BrokenReader {
        sent: bool,
    }

    impl AsyncRead for BrokenReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            if !self.sent {
                self.sent = true;
                buf.put_slice(b"part");
                Poll::Ready(Ok(()))
            } else {
                Poll::Ready(Err(std::io::Error::other("connection reset")))
            }
        }
    }

    fn client(mock: MockHttp) -> DriveClient {
        DriveClient::with_retry_config(Arc::new(mock), "test_token".to_string(), fast_retry_config())
    }

    type Reader = Box<dyn AsyncRead + Send + Unpin>;

    #[tokio::test]
    async fn test_download_writes_destination() {
        let mut mock = MockHttp::new();
        mock.expect_stream()
            .times(1)
            .withf(|req| req.url.contains("alt=media") && req.headers.contains_key("Authorization"))
            .returning(|_| Ok(Box::new(Cursor::new(b"payload".to_vec())) as Reader));

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");

        client(mock).download("f1", &dest).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"payload");
    }

    #[tokio::test]
    async fn test_stream_error_retries_and_truncates() {
        let mut mock = MockHttp::new();
        let mut calls = 0;
        mock.expect_stream().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(Box::new(BrokenReader { sent: false }) as Reader)
            } else {
                Ok(Box::new(Cursor::new(b"payload".to_vec())) as Reader)
            }
        });

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");

        client(mock).download("f1", &dest).await.unwrap();

        // The first attempt's partial bytes are gone: the destination was
        // reopened, not appended to.
        assert_eq!(std::fs::read(&dest).unwrap(), b"payload");
    }

    #[tokio::test]
    async fn test_request_error_exhausts_budget() {
        let mut mock = MockHttp::new();
        // download family: six attempts, never a seventh.
        mock.expect_stream()
            .times(6)
            .returning(|_| Err(TransportError::Connect("refused".to_string())));

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");

        let err = client(mock).download("f1", &dest).await.unwrap_err();
        assert!(matches!(err, DriveError::Transport(_)));
    }

    #[tokio::test]
    async fn test_forbidden_stream_is_terminal() {
        let mut mock = MockHttp::new();
        mock.expect_stream().times(1).returning(|_| {
            Err(TransportError::Status {
                status: 403,
                body: format!(
                    r#"{{"error":{{"code":403,"message":"{}"}}}}"#,
                    INSUFFICIENT_PERMISSIONS_MESSAGE
                ),
            })
        });

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");

        let err = client(mock).download("f1", &dest).await.unwrap_err();
        assert!(err.is_insufficient_permissions());
    }
}
