use serde::Deserialize;
use serde_json::Value;
use std::time::Instant;

/// A file cabinet (or document basket) visible to the authenticated user.
/// Constructed fresh on every listing call; never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct Cabinet {
    pub id: String,
    pub name: String,
    pub is_basket: bool,
}

/// Reference to a stored document.
///
/// `fields` is populated only when the listing response embedded field data
/// inline; otherwise it is `None` and the fields must be fetched separately.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRef {
    pub id: String,
    pub fields: Option<Vec<Value>>,
}

/// Cached token state held by the token manager.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Instant,
}

/// Token response from the identity server's `/connect/token` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Declared lifetime in seconds, typically ~3600.
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}
