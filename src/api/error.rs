//! Error taxonomy and failure classification
//!
//! Every failed physical attempt is mapped into [`ApiError`]; the request
//! pipeline consults [`ApiError::is_retryable`] to decide between backoff
//! and surfacing the failure. Server error bodies are mined for a
//! human-readable message in any of the envelope shapes different server
//! versions produce.

use thiserror::Error;

use super::normalize::{first_present, scalar_string};
use super::xml::xml_to_value;

/// Classified failure of a logical API call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Credential exchange failed or the identity server is unreachable.
    /// Fatal to the logical call; never retried.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// No response was received (connect failure, timeout). Retryable.
    #[error("network error: {0}")]
    Network(String),

    /// HTTP 429. Retryable.
    #[error("rate limited (HTTP 429): {message}")]
    RateLimited { message: String },

    /// HTTP 5xx. Retryable.
    #[error("server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// HTTP 4xx other than 401/429. Fatal; not retried.
    #[error("request rejected (HTTP {status}): {message}")]
    Client { status: u16, message: String },

    /// All seat licenses are taken. Detected from server message text,
    /// regardless of status code. Freeing a license requires external
    /// action, so this is terminal.
    #[error("DocuWare licenses are in use, free a client license and retry (HTTP {status})")]
    LicenseExhausted { status: u16, message: String },

    /// Every candidate content endpoint answered 404.
    #[error("no suitable file endpoint found (tried all known variants)")]
    NoContentEndpoint,

    /// A 2xx response body could not be parsed. Indicates protocol drift
    /// worth surfacing rather than an empty result.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The destination sink failed while persisting content.
    #[error("content sink failed: {0}")]
    Sink(String),
}

impl ApiError {
    /// Whether the pipeline may retry after this failure.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Network(_) | ApiError::RateLimited { .. } | ApiError::Server { .. }
        )
    }

    /// Originating HTTP status, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RateLimited { .. } => Some(429),
            ApiError::Server { status, .. }
            | ApiError::Client { status, .. }
            | ApiError::LicenseExhausted { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Message text marking the license-capacity condition, matched
/// case-insensitively against extracted server text.
const LICENSE_KEYWORD: &str = "licenses";

/// Known locations of human-readable text in error bodies. XML envelopes
/// appear with and without the `s:` namespace prefix depending on server
/// version (the XML bridge strips prefixes, but the prefixed spellings are
/// kept for bodies parsed from JSON); JSON errors carry a flat `message`.
const ERROR_MESSAGE_SHAPES: &[&[&str]] = &[
    &["Error", "Message"],
    &["s:Error", "s:Message"],
    &["Error", "Exception"],
    &["s:Error", "s:Exception"],
    &["message"],
];

/// Classify a non-2xx response into the error taxonomy.
pub fn classify_status(status: u16, body: &str) -> ApiError {
    let extracted = extract_message(body);

    if let Some(message) = &extracted {
        if message.to_lowercase().contains(LICENSE_KEYWORD) {
            return ApiError::LicenseExhausted {
                status,
                message: message.clone(),
            };
        }
    }

    let message = extracted.unwrap_or_else(|| "DocuWare error".to_string());
    match status {
        401 => ApiError::Auth(message),
        429 => ApiError::RateLimited { message },
        500..=599 => ApiError::Server { status, message },
        _ => ApiError::Client { status, message },
    }
}

/// Pull a human-readable message out of a structured error body, if the
/// body parses and any known shape is present.
fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim_start();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = if trimmed.starts_with('{') || trimmed.starts_with('[') {
        serde_json::from_str(body).ok()?
    } else {
        xml_to_value(body).ok()?
    };

    first_present(&parsed, ERROR_MESSAGE_SHAPES).and_then(|v| scalar_string(Some(v)))
}
