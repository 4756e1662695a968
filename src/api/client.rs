//! High-level DocuWare Platform client
//!
//! Facade over the token manager, request pipeline, and response
//! normalizer. Covers cabinet listing, document listing, field retrieval,
//! and binary content download with ordered endpoint fallback.

use log::{debug, info};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use super::auth::TokenManager;
use super::constants::{self, DEFAULT_DOCUMENT_COUNT, DEFAULT_DOCUMENT_PAGE};
use super::error::ApiError;
use super::models::{Cabinet, DocumentRef};
use super::normalize;
use super::pipeline::{RequestPipeline, RetryConfig};
use super::sink::{ContentSink, FileSink};
use super::transport::{ApiRequest, HttpTransport, Transport};
use crate::config::ClientConfig;

/// Outcome of trying one candidate content endpoint.
enum CandidateOutcome {
    Delivered(u64),
    NotFoundHere,
    Fatal(ApiError),
}

pub struct DocuWareClient {
    config: ClientConfig,
    pipeline: RequestPipeline,
}

impl DocuWareClient {
    /// Build a client over the reqwest transport.
    pub fn new(config: ClientConfig) -> anyhow::Result<Self> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config.timeout)?);
        Ok(Self::with_transport(config, transport))
    }

    /// Build against a custom transport (tests, alternative HTTP stacks).
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let tokens = TokenManager::new(&config, transport.clone());
        let retry = RetryConfig {
            max_retries: config.retries,
            ..RetryConfig::default()
        };
        let pipeline = RequestPipeline::new(transport, tokens, retry);
        Self { config, pipeline }
    }

    fn get(&self, url: String) -> ApiRequest {
        ApiRequest::get(url).with_accept(self.config.accept.header_value())
    }

    /// List all file cabinets (including baskets) visible to the user.
    pub async fn list_file_cabinets(&self) -> Result<Vec<Cabinet>, ApiError> {
        let request = self.get(constants::file_cabinets_endpoint(&self.config.platform_url));
        let response = self.pipeline.execute(&request).await?;
        let root = normalize::parse_payload(&response.text())?;
        normalize::cabinets(&root)
    }

    /// List one page of documents in a cabinet.
    pub async fn list_documents(
        &self,
        cabinet_id: &str,
        count: u32,
        page: u32,
    ) -> Result<Vec<DocumentRef>, ApiError> {
        let request = self
            .get(constants::documents_endpoint(
                &self.config.platform_url,
                cabinet_id,
            ))
            .with_query(vec![
                ("count".to_string(), count.to_string()),
                ("page".to_string(), page.to_string()),
            ]);
        let response = self.pipeline.execute(&request).await?;
        let root = normalize::parse_payload(&response.text())?;
        Ok(normalize::documents(&root))
    }

    /// First page of documents with the default page size.
    pub async fn list_documents_first_page(
        &self,
        cabinet_id: &str,
    ) -> Result<Vec<DocumentRef>, ApiError> {
        self.list_documents(cabinet_id, DEFAULT_DOCUMENT_COUNT, DEFAULT_DOCUMENT_PAGE)
            .await
    }

    /// Fetch a document's index fields. Field shape is passed through from
    /// the server uninterpreted.
    pub async fn get_document_fields(
        &self,
        cabinet_id: &str,
        doc_id: &str,
    ) -> Result<Vec<Value>, ApiError> {
        let request = self.get(constants::document_fields_endpoint(
            &self.config.platform_url,
            cabinet_id,
            doc_id,
        ));
        let response = self.pipeline.execute(&request).await?;
        let root = normalize::parse_payload(&response.text())?;
        Ok(normalize::fields(&root))
    }

    /// Download document content into `sink`, trying each known endpoint
    /// variant in order. A 404 from a candidate means that server version
    /// does not expose content there; any other failure aborts. Returns
    /// the number of bytes delivered.
    pub async fn download_document(
        &self,
        cabinet_id: &str,
        doc_id: &str,
        sink: &mut dyn ContentSink,
    ) -> Result<u64, ApiError> {
        let candidates = constants::file_candidate_endpoints(
            &self.config.platform_url,
            cabinet_id,
            doc_id,
        );

        for url in &candidates {
            match self.try_candidate(url, sink).await {
                CandidateOutcome::Delivered(bytes) => {
                    info!("downloaded {bytes} bytes for document {doc_id} from {url}");
                    return Ok(bytes);
                }
                CandidateOutcome::NotFoundHere => {
                    debug!("no content at {url}, trying next candidate");
                }
                CandidateOutcome::Fatal(e) => return Err(e),
            }
        }

        Err(ApiError::NoContentEndpoint)
    }

    /// Download document content to a file on disk. A failed download
    /// removes the destination file rather than leaving a truncated or
    /// empty one behind.
    pub async fn download_document_to_path(
        &self,
        cabinet_id: &str,
        doc_id: &str,
        path: impl AsRef<Path>,
    ) -> Result<u64, ApiError> {
        let path = path.as_ref();
        let mut sink = FileSink::create(path)
            .await
            .map_err(|e| ApiError::Sink(e.to_string()))?;
        match self.download_document(cabinet_id, doc_id, &mut sink).await {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                drop(sink);
                let _ = tokio::fs::remove_file(path).await;
                Err(e)
            }
        }
    }

    async fn try_candidate(&self, url: &str, sink: &mut dyn ContentSink) -> CandidateOutcome {
        // Binary content: no accept preference, take what the server has.
        let request = ApiRequest::get(url.to_string());
        match self.pipeline.execute(&request).await {
            Ok(response) => {
                if let Err(e) = sink.write(&response.body).await {
                    return CandidateOutcome::Fatal(ApiError::Sink(e.to_string()));
                }
                if let Err(e) = sink.finish().await {
                    return CandidateOutcome::Fatal(ApiError::Sink(e.to_string()));
                }
                CandidateOutcome::Delivered(response.body.len() as u64)
            }
            Err(ApiError::Client { status: 404, .. }) => CandidateOutcome::NotFoundHere,
            Err(e) => CandidateOutcome::Fatal(e),
        }
    }
}
