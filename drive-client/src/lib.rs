//! # Drive Client
//!
//! Resilient client for the Drive API v3: file retrieval and search,
//! creation, copy, update and delete, parent relationship edits, sharing
//! permission lifecycle, custom property merges and streaming downloads.
//!
//! ## Overview
//!
//! Three pieces cooperate:
//!
//! - [`retry`] - bounded exponential-backoff wrapper around one remote call,
//!   with per-operation error classification (transient, fatal, or benign
//!   no-op for idempotent deletes)
//! - [`pager`] - pagination aggregation that follows continuation tokens
//!   until a listing is complete, all-or-nothing
//! - [`DriveClient`] - the operation façade, one method per remote call,
//!   plus a stream downloader that shares one retry budget across request
//!   and stream faults
//!
//! The network sits behind the `drive-transport` [`HttpClient`] seam;
//! production code injects `drive-transport-reqwest`, tests inject a mock.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use drive_client::DriveClient;
//! use drive_transport_reqwest::ReqwestTransport;
//!
//! let client = DriveClient::new(Arc::new(ReqwestTransport::new()), access_token);
//!
//! let about = client.about().await?;
//! let files = client.get_files(Default::default()).await?;
//! client.download("fileId", std::path::Path::new("/tmp/out.bin")).await?;
//! ```

pub mod client;
pub mod error;
pub mod pager;
pub mod params;
pub mod retry;
pub mod types;

mod download;

#[cfg(test)]
pub(crate) mod testing;

pub use client::DriveClient;
pub use error::{DriveError, Result};
pub use params::{
    AddPermissionParams, CopyParams, CreateFileParams, ListParams, UpdatePermissionParams,
};
pub use retry::{ErrorClass, RetryConfig, RetryPolicy};
pub use types::{About, DriveFile, Permission};

// Re-export the transport seam so callers can inject their own client.
pub use drive_transport::HttpClient;
