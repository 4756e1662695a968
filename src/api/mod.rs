//! DocuWare Platform API client core
//!
//! Three coupled pieces make up the core: the token lifecycle manager
//! ([`auth`]), the resilient request pipeline ([`pipeline`]), and the
//! response normalizer ([`normalize`]). The pipeline leans on the token
//! manager's renewal contract for its 401 replay; the download fallback
//! leans on the pipeline's error classification to decide whether the
//! next candidate endpoint is worth trying.

pub mod auth;
pub mod client;
pub mod constants;
pub mod error;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod sink;
pub mod transport;
mod xml;

pub use auth::TokenManager;
pub use client::DocuWareClient;
pub use error::ApiError;
pub use models::{Cabinet, DocumentRef, TokenInfo, TokenResponse};
pub use pipeline::{RequestPipeline, RetryConfig};
pub use sink::{BufferSink, ContentSink, FileSink};
pub use transport::{ApiRequest, HttpTransport, Method, RawResponse, Transport, TransportError};
