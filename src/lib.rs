//! A resilient client core for the DocuWare Platform REST API.
//!
//! Handles credential lifecycle (password and refresh grants with
//! single-flight renewal), retries with exponential backoff and one-shot
//! 401 reauthentication, and normalization of the response shapes
//! different Platform server versions produce. Covers cabinet listing,
//! document listing, field retrieval, and binary content download.

pub mod api;
pub mod config;

pub use api::{
    ApiError, BufferSink, Cabinet, ContentSink, DocuWareClient, DocumentRef, FileSink,
    RetryConfig, TokenManager, Transport,
};
pub use config::{AcceptFormat, ClientConfig};
