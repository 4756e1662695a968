//! Token lifecycle management
//!
//! [`TokenManager`] owns the only shared mutable state in the client: the
//! cached bearer token. Acquisition is single-flight — when many
//! concurrent operations discover an expired token at once, exactly one
//! network exchange runs and every caller awaits its shared outcome.
//!
//! Renewal prefers the refresh grant when a refresh token is held and
//! falls back to a full password login inside the same renewal if the
//! refresh is rejected. Token acquisition itself is never retried; retry
//! is the pipeline's job and only for *using* the token.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use log::{debug, warn};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::constants::{
    self, TOKEN_EXPIRY_SKEW_SECS, TOKEN_LIFETIME_CEILING_SECS, TOKEN_LIFETIME_FLOOR_SECS, headers,
};
use super::error::ApiError;
use super::models::{TokenInfo, TokenResponse};
use super::transport::{ApiRequest, Transport};
use crate::config::ClientConfig;

type RenewalFuture = Shared<BoxFuture<'static, Result<String, ApiError>>>;

struct TokenState {
    token: Option<TokenInfo>,
    /// At most one renewal outstanding; concurrent acquirers join it.
    renewal: Option<RenewalFuture>,
}

struct TokenManagerInner {
    transport: Arc<dyn Transport>,
    token_url: String,
    username: String,
    password: String,
    client_id: String,
    client_secret: Option<String>,
    scope: String,
    // Guards the slot only; never held across an await.
    state: Mutex<TokenState>,
}

/// Acquires, caches, and renews bearer credentials.
#[derive(Clone)]
pub struct TokenManager {
    inner: Arc<TokenManagerInner>,
}

impl TokenManager {
    pub fn new(config: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(TokenManagerInner {
                transport,
                token_url: constants::token_endpoint(&config.identity_url),
                username: config.username.clone(),
                password: config.password.clone(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
                scope: config.scope.clone(),
                state: Mutex::new(TokenState {
                    token: None,
                    renewal: None,
                }),
            }),
        }
    }

    /// Return a valid access token, renewing if needed. The cached-valid
    /// path involves no locking across awaits and no network call.
    pub async fn acquire_token(&self) -> Result<String, ApiError> {
        let renewal = {
            let mut state = self
                .inner
                .state
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());

            if let Some(token) = &state.token {
                if Instant::now() < token.expires_at {
                    return Ok(token.access_token.clone());
                }
            }

            match &state.renewal {
                Some(pending) => pending.clone(),
                None => {
                    let refresh_token =
                        state.token.as_ref().and_then(|t| t.refresh_token.clone());
                    let renewal = Self::renew(self.inner.clone(), refresh_token)
                        .boxed()
                        .shared();
                    state.renewal = Some(renewal.clone());
                    renewal
                }
            }
        };

        renewal.await
    }

    /// Force the next acquisition to renew even if the cached expiry has
    /// not elapsed; the server may have revoked the token early. The held
    /// refresh token stays usable for the refresh grant.
    pub fn invalidate(&self) {
        let mut state = self
            .inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(token) = state.token.as_mut() {
            token.expires_at = Instant::now();
        }
    }

    /// The single outstanding renewal. Clears the in-flight slot exactly
    /// once, when the exchange settles, before publishing the outcome.
    async fn renew(
        inner: Arc<TokenManagerInner>,
        refresh_token: Option<String>,
    ) -> Result<String, ApiError> {
        let result = Self::exchange(&inner, refresh_token).await;

        let mut state = inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        state.renewal = None;
        match result {
            Ok(info) => {
                debug!("token renewed, valid for {:?}", info.expires_at - Instant::now());
                let access = info.access_token.clone();
                state.token = Some(info);
                Ok(access)
            }
            Err(e) => {
                warn!("token renewal failed: {e}");
                Err(e)
            }
        }
    }

    async fn exchange(
        inner: &Arc<TokenManagerInner>,
        refresh_token: Option<String>,
    ) -> Result<TokenInfo, ApiError> {
        if let Some(refresh) = refresh_token {
            debug!("renewing access token via refresh grant");
            match Self::token_request(inner, Self::refresh_form(inner, &refresh)).await {
                Ok(info) => return Ok(info),
                Err(e) => {
                    // Expired or revoked refresh tokens are routine; a full
                    // login still works.
                    warn!("refresh grant failed, falling back to password login: {e}");
                }
            }
        }

        debug!("logging in via password grant");
        Self::token_request(inner, Self::password_form(inner)).await
    }

    async fn token_request(
        inner: &Arc<TokenManagerInner>,
        form: Vec<(String, String)>,
    ) -> Result<TokenInfo, ApiError> {
        let request = ApiRequest::post_form(inner.token_url.clone(), form)
            .with_accept(headers::ACCEPT_JSON);

        let response = inner
            .transport
            .send(&request, None)
            .await
            .map_err(|e| ApiError::Auth(format!("identity server unreachable: {e}")))?;

        if !response.is_success() {
            return Err(ApiError::Auth(format!(
                "token request failed (HTTP {}): {}",
                response.status,
                response.text()
            )));
        }

        let parsed: TokenResponse = serde_json::from_slice(&response.body)
            .map_err(|e| ApiError::Auth(format!("invalid token response: {e}")))?;
        Ok(token_info_from(parsed))
    }

    fn password_form(inner: &TokenManagerInner) -> Vec<(String, String)> {
        let mut form = vec![
            ("grant_type".to_string(), "password".to_string()),
            ("username".to_string(), inner.username.clone()),
            ("password".to_string(), inner.password.clone()),
            ("client_id".to_string(), inner.client_id.clone()),
        ];
        if let Some(secret) = &inner.client_secret {
            form.push(("client_secret".to_string(), secret.clone()));
        }
        form.push(("scope".to_string(), inner.scope.clone()));
        form
    }

    fn refresh_form(inner: &TokenManagerInner, refresh_token: &str) -> Vec<(String, String)> {
        let mut form = vec![
            ("grant_type".to_string(), "refresh_token".to_string()),
            ("refresh_token".to_string(), refresh_token.to_string()),
            ("client_id".to_string(), inner.client_id.clone()),
        ];
        if let Some(secret) = &inner.client_secret {
            form.push(("client_secret".to_string(), secret.clone()));
        }
        form
    }
}

/// Compute cached token state from an identity server response.
///
/// The declared lifetime is clamped between 60s and 24h, then shortened by
/// a 30s skew so the token is renewed before it actually lapses. A response
/// without a refresh token means "keep none", not "keep the old one".
fn token_info_from(response: TokenResponse) -> TokenInfo {
    let ttl = response
        .expires_in
        .clamp(TOKEN_LIFETIME_FLOOR_SECS, TOKEN_LIFETIME_CEILING_SECS);
    TokenInfo {
        access_token: response.access_token,
        refresh_token: response.refresh_token,
        expires_at: Instant::now() + Duration::from_secs(ttl - TOKEN_EXPIRY_SKEW_SECS),
    }
}
