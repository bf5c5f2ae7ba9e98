use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    /// A stream request answered with a non-success status. The body is the
    /// remote error payload, read in full before the stream is discarded.
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
