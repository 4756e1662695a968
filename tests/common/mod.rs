//! Shared test doubles for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use docuware_client::api::{ApiRequest, RawResponse, Transport, TransportError};
use docuware_client::config::ClientConfig;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Scripted outcome for one physical resource attempt, consumed in order.
pub enum Scripted {
    Status(u16, &'static str),
    NetworkError(&'static str),
}

/// Fake transport implementing both the identity endpoint and Platform
/// resources. Token grants are synthesized (and optionally delayed or
/// failed); resource requests consume the script front to back.
pub struct FakeTransport {
    script: Mutex<VecDeque<Scripted>>,
    resource_log: Mutex<Vec<String>>,
    grant_log: Mutex<Vec<String>>,
    token_requests: AtomicU32,
    logins_to_fail: AtomicU32,
    fail_refresh: bool,
    issue_refresh_tokens: bool,
    token_delay: Duration,
    expires_in: u64,
}

impl FakeTransport {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            resource_log: Mutex::new(Vec::new()),
            grant_log: Mutex::new(Vec::new()),
            token_requests: AtomicU32::new(0),
            logins_to_fail: AtomicU32::new(0),
            fail_refresh: false,
            issue_refresh_tokens: false,
            token_delay: Duration::ZERO,
            expires_in: 3600,
        }
    }

    /// Hold every token exchange open for `delay`, widening the window in
    /// which concurrent acquirers must join the same renewal.
    pub fn with_token_delay(mut self, delay: Duration) -> Self {
        self.token_delay = delay;
        self
    }

    /// Issue a refresh token with every grant response.
    pub fn with_refresh_tokens(mut self) -> Self {
        self.issue_refresh_tokens = true;
        self
    }

    /// Reject refresh grants with HTTP 400, as for an expired refresh
    /// token.
    pub fn with_failing_refresh(mut self) -> Self {
        self.fail_refresh = true;
        self
    }

    /// Fail the next `n` password logins with HTTP 500.
    pub fn with_failing_logins(mut self, n: u32) -> Self {
        self.logins_to_fail = AtomicU32::new(n);
        self
    }

    pub fn token_requests(&self) -> u32 {
        self.token_requests.load(Ordering::SeqCst)
    }

    /// Grant types seen at the identity endpoint, in order.
    pub fn grants(&self) -> Vec<String> {
        self.grant_log.lock().unwrap().clone()
    }

    /// Resource requests seen, as "url bearer" entries, in order.
    pub fn resource_requests(&self) -> Vec<String> {
        self.resource_log.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<RawResponse, TransportError> {
        if request.url.ends_with("/connect/token") {
            let n = self.token_requests.fetch_add(1, Ordering::SeqCst) + 1;
            let form = request.form.as_ref().expect("token request without form body");
            let grant = form
                .iter()
                .find(|(key, _)| key == "grant_type")
                .map(|(_, value)| value.clone())
                .expect("token request without grant_type");
            self.grant_log.lock().unwrap().push(grant.clone());

            if !self.token_delay.is_zero() {
                tokio::time::sleep(self.token_delay).await;
            }

            if grant == "refresh_token" && self.fail_refresh {
                return Ok(RawResponse {
                    status: 400,
                    body: br#"{"message":"refresh token expired"}"#.to_vec(),
                });
            }
            if grant == "password" {
                let should_fail = self
                    .logins_to_fail
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_sub(1))
                    .is_ok();
                if should_fail {
                    return Ok(RawResponse {
                        status: 500,
                        body: br#"{"message":"identity server unavailable"}"#.to_vec(),
                    });
                }
            }

            let mut body = format!(
                r#"{{"access_token":"tok-{n}","token_type":"Bearer","expires_in":{}"#,
                self.expires_in
            );
            if self.issue_refresh_tokens {
                body.push_str(&format!(r#","refresh_token":"refresh-{n}""#));
            }
            body.push('}');
            return Ok(RawResponse {
                status: 200,
                body: body.into_bytes(),
            });
        }

        let mut entry = request.url.clone();
        if !request.query.is_empty() {
            let query: Vec<String> = request
                .query
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect();
            entry.push('?');
            entry.push_str(&query.join("&"));
        }
        entry.push(' ');
        entry.push_str(bearer.unwrap_or("<none>"));
        self.resource_log.lock().unwrap().push(entry);

        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Status(status, body)) => Ok(RawResponse {
                status,
                body: body.as_bytes().to_vec(),
            }),
            Some(Scripted::NetworkError(message)) => Err(TransportError(message.to_string())),
            None => Ok(RawResponse {
                status: 200,
                body: Vec::new(),
            }),
        }
    }
}

/// Route client logs through env_logger when RUST_LOG asks for them.
/// Safe to call from every test; only the first call installs the logger.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn test_config() -> ClientConfig {
    init_logging();
    ClientConfig::new(
        "https://dw.example.com/DocuWare/Platform".to_string(),
        "https://dw.example.com/DocuWare/Identity".to_string(),
        "user".to_string(),
        "secret".to_string(),
        "client-id".to_string(),
    )
}
