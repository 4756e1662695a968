//! Transport boundary
//!
//! The pipeline and token manager speak to the network through the
//! [`Transport`] trait so tests can substitute scripted fakes.
//! [`HttpTransport`] is the reqwest-backed production implementation.

use async_trait::async_trait;
use std::borrow::Cow;
use std::time::Duration;
use thiserror::Error;

/// HTTP method for an API request. The client core only issues reads and
/// form posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Description of one physical HTTP request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    /// Form-encoded body, used for token grants.
    pub form: Option<Vec<(String, String)>>,
    pub accept: Option<&'static str>,
}

impl ApiRequest {
    pub fn get(url: String) -> Self {
        Self {
            method: Method::Get,
            url,
            query: Vec::new(),
            form: None,
            accept: None,
        }
    }

    pub fn post_form(url: String, form: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Post,
            url,
            query: Vec::new(),
            form: Some(form),
            accept: None,
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_accept(mut self, accept: &'static str) -> Self {
        self.accept = Some(accept);
        self
    }
}

/// Buffered response from a physical attempt. Non-2xx statuses are still
/// `Ok` at this layer; classification happens in the pipeline.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// No HTTP response was received at all (connect failure, timeout,
/// interrupted body read). Distinct from a non-2xx response.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<RawResponse, TransportError>;
}

/// Production transport with connection pooling and bounded timeouts.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent("docuware-client/0.1")
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<RawResponse, TransportError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(accept) = request.accept {
            builder = builder.header("Accept", accept);
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(form) = &request.form {
            builder = builder.form(form);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError(e.to_string()))?
            .to_vec();

        Ok(RawResponse { status, body })
    }
}
