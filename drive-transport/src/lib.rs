//! # Drive Transport
//!
//! HTTP transport abstraction for the Drive client.
//!
//! ## Overview
//!
//! This crate defines the contract between the Drive operation layer and the
//! network. The [`HttpClient`](http::HttpClient) trait executes exactly one
//! request per call; retry, backoff and pagination live above this seam so
//! that tests can mock the network without any retry behavior hidden below.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - single-shot request execution and
//!   byte-stream downloads
//!
//! ## Error Handling
//!
//! All transport implementations report failures through
//! [`TransportError`](error::TransportError). Implementations should:
//!
//! - Convert client-library errors to `TransportError`
//! - Distinguish timeouts and connection failures from other request faults
//! - Surface non-success stream responses with their status and body
//!
//! ## Thread Safety
//!
//! `HttpClient` requires `Send + Sync` so one client can be shared across
//! concurrent operations.

pub mod error;
pub mod http;

pub use error::{Result, TransportError};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
