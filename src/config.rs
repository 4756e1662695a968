//! Client configuration
//!
//! Plain struct consumed by the client core; loading from the environment
//! is a convenience for hosts that configure via `.env` / process env.

use anyhow::Result;
use log::info;
use std::time::Duration;

use crate::api::constants::{self, headers};

/// Accept-content-type preference for Platform resource calls. The
/// Platform answers XML by default and JSON when asked; the normalizer
/// handles both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcceptFormat {
    #[default]
    Xml,
    Json,
}

impl AcceptFormat {
    pub fn header_value(self) -> &'static str {
        match self {
            AcceptFormat::Xml => headers::ACCEPT_XML,
            AcceptFormat::Json => headers::ACCEPT_JSON,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Platform base URL, e.g. `https://host/DocuWare/Platform`.
    pub platform_url: String,
    /// Identity server base URL.
    pub identity_url: String,
    pub username: String,
    pub password: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub scope: String,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    pub accept: AcceptFormat,
    /// Additional attempts beyond the first per logical call.
    pub retries: u32,
}

impl ClientConfig {
    /// Build a config with defaults for the optional knobs. Base URLs are
    /// normalized by trimming trailing slashes.
    pub fn new(
        platform_url: String,
        identity_url: String,
        username: String,
        password: String,
        client_id: String,
    ) -> Self {
        Self {
            platform_url: platform_url.trim_end_matches('/').to_string(),
            identity_url: identity_url.trim_end_matches('/').to_string(),
            username,
            password,
            client_id,
            client_secret: None,
            scope: constants::DEFAULT_SCOPE.to_string(),
            timeout: Duration::from_secs(60),
            accept: AcceptFormat::default(),
            retries: 2,
        }
    }

    /// Load configuration from `DW_*` environment variables, reading a
    /// `.env` file first when one is present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        info!("Loading DocuWare configuration from environment");

        let platform_url = std::env::var("DW_PLATFORM_URL")
            .map_err(|_| anyhow::anyhow!("DW_PLATFORM_URL environment variable not set"))?;
        let identity_url = std::env::var("DW_IDENTITY_URL")
            .map_err(|_| anyhow::anyhow!("DW_IDENTITY_URL environment variable not set"))?;
        let username = std::env::var("DW_USERNAME")
            .map_err(|_| anyhow::anyhow!("DW_USERNAME environment variable not set"))?;
        let password = std::env::var("DW_PASSWORD")
            .map_err(|_| anyhow::anyhow!("DW_PASSWORD environment variable not set"))?;
        let client_id = std::env::var("DW_CLIENT_ID")
            .map_err(|_| anyhow::anyhow!("DW_CLIENT_ID environment variable not set"))?;

        let mut config = Self::new(platform_url, identity_url, username, password, client_id);

        if let Ok(secret) = std::env::var("DW_CLIENT_SECRET") {
            if !secret.is_empty() {
                config.client_secret = Some(secret);
            }
        }
        if let Ok(scope) = std::env::var("DW_SCOPE") {
            config.scope = scope;
        }
        if let Ok(timeout) = std::env::var("DW_TIMEOUT_SECS") {
            let secs: u64 = timeout
                .parse()
                .map_err(|_| anyhow::anyhow!("DW_TIMEOUT_SECS must be a number of seconds"))?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Ok(accept) = std::env::var("DW_ACCEPT") {
            config.accept = match accept.to_lowercase().as_str() {
                "json" => AcceptFormat::Json,
                "xml" => AcceptFormat::Xml,
                other => anyhow::bail!("DW_ACCEPT must be 'xml' or 'json', got '{other}'"),
            };
        }
        if let Ok(retries) = std::env::var("DW_RETRIES") {
            config.retries = retries
                .parse()
                .map_err(|_| anyhow::anyhow!("DW_RETRIES must be a non-negative integer"))?;
        }

        Ok(config)
    }
}
