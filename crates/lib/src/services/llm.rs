//! Extraction-service seam and its REST implementation.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::errors::MetadataError;
use crate::extraction::{ExtractionRequest, ExtractionResponse};
use crate::services::RestClient;

/// The LLM metadata-extraction boundary. Results are matched back to fields
/// by `field_name == field.title`.
#[async_trait]
pub trait LlmExtractor: Send + Sync {
    async fn extract(&self, request: &ExtractionRequest)
        -> Result<ExtractionResponse, MetadataError>;
}

/// Calls the hosted extraction endpoint.
pub struct LlmExtractionService {
    client: Arc<dyn RestClient>,
    base_url: String,
}

impl LlmExtractionService {
    pub fn new(client: Arc<dyn RestClient>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl LlmExtractor for LlmExtractionService {
    async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<ExtractionResponse, MetadataError> {
        let url = format!("{}/api/extract/metadata", self.base_url);
        info!("Requesting extraction of {} fields", request.fields.len());

        let body = serde_json::to_value(request)?;
        let raw = self.client.post_json(&url, &body, &[]).await?;
        Ok(serde_json::from_value(raw)?)
    }
}
