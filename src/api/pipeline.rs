//! Resilient request pipeline
//!
//! Turns one logical API call into as many physical attempts as the
//! policy allows: attaches the current bearer token, classifies failures,
//! backs off exponentially on retryable ones, and spends a single
//! reauthentication replay when the server answers 401. The replay budget
//! is disjoint from the retry budget — one replay per logical call, no
//! matter how many retries run.

use log::{debug, warn};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use super::auth::TokenManager;
use super::error::{ApiError, classify_status};
use super::transport::{ApiRequest, RawResponse, Transport};

/// Retry behavior configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Additional attempts beyond the first.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Randomize delays to spread simultaneous clients. Off by default so
    /// delays grow strictly.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(300),
            max_delay: Duration::from_secs(30),
            jitter: false,
        }
    }
}

/// Executes logical API calls with retry, backoff, and one-shot
/// reauthentication.
pub struct RequestPipeline {
    transport: Arc<dyn Transport>,
    tokens: TokenManager,
    retry: RetryConfig,
}

impl RequestPipeline {
    pub fn new(transport: Arc<dyn Transport>, tokens: TokenManager, retry: RetryConfig) -> Self {
        Self {
            transport,
            tokens,
            retry,
        }
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Execute one logical call. Returns the raw 2xx response, or the
    /// final classified error once the budgets are spent.
    pub async fn execute(&self, request: &ApiRequest) -> Result<RawResponse, ApiError> {
        let mut replayed_auth = false;
        let mut attempt: u32 = 0;

        loop {
            let mut outcome = self.attempt(request).await;

            if !replayed_auth && matches!(&outcome, Ok(r) if r.status == 401) {
                replayed_auth = true;
                debug!("received HTTP 401, forcing token renewal and replaying once");
                self.tokens.invalidate();
                outcome = self.attempt(request).await;
            }

            let error = match outcome {
                Ok(response) if response.is_success() => return Ok(response),
                Ok(response) => classify_status(response.status, &response.text()),
                Err(e) => e,
            };

            if error.is_retryable() && attempt < self.retry.max_retries {
                let delay = self.backoff_delay(attempt);
                warn!(
                    "attempt {}/{} failed ({error}), retrying in {:?}",
                    attempt + 1,
                    self.retry.max_retries + 1,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            return Err(error);
        }
    }

    /// One physical attempt: token first, then the wire. Token failures
    /// and transport failures both come back classified.
    async fn attempt(&self, request: &ApiRequest) -> Result<RawResponse, ApiError> {
        let token = self.tokens.acquire_token().await?;
        self.transport
            .send(request, Some(&token))
            .await
            .map_err(|e| ApiError::Network(e.to_string()))
    }

    /// Exponential backoff, attempt-indexed, capped, optionally jittered.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = self
            .retry
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        let mut delay = exp.min(self.retry.max_delay);

        if self.retry.jitter {
            let factor = rand::thread_rng().gen_range(0.5..=1.5);
            delay = Duration::from_millis((delay.as_millis() as f64 * factor) as u64);
        }

        delay
    }
}
