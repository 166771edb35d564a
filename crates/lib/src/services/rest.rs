//! REST client seam and its reqwest-backed implementation.

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde_json::Value;
use tracing::debug;

use crate::errors::MetadataError;

/// JSON-over-HTTP client boundary. Implementations reject with a
/// descriptive error on any non-success status.
#[async_trait]
pub trait RestClient: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value, MetadataError>;

    /// Posts a JSON body. `headers` override the client's defaults, which
    /// callers use to force `odata=nometadata` responses.
    async fn post_json(
        &self,
        url: &str,
        body: &Value,
        headers: &[(&str, &str)],
    ) -> Result<Value, MetadataError>;
}

/// A [`RestClient`] for the SharePoint REST API.
#[derive(Clone, Debug)]
pub struct SharePointRestClient {
    client: ReqwestClient,
    bearer_token: Option<String>,
}

impl SharePointRestClient {
    pub fn new(bearer_token: Option<String>) -> Result<Self, MetadataError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(MetadataError::RestClientBuild)?;
        Ok(Self {
            client,
            bearer_token,
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl RestClient for SharePointRestClient {
    async fn get_json(&self, url: &str) -> Result<Value, MetadataError> {
        debug!("GET {url}");
        let request = self
            .authorize(self.client.get(url))
            .header("Accept", "application/json;odata=nometadata");

        let response = request.send().await.map_err(MetadataError::RestRequest)?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(MetadataError::Api { status, body });
        }
        response
            .json()
            .await
            .map_err(MetadataError::RestDeserialization)
    }

    async fn post_json(
        &self,
        url: &str,
        body: &Value,
        headers: &[(&str, &str)],
    ) -> Result<Value, MetadataError> {
        debug!("POST {url}");
        let mut request = self
            .authorize(self.client.post(url))
            .header("Accept", "application/json;odata=nometadata")
            .json(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await.map_err(MetadataError::RestRequest)?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(MetadataError::Api { status, body });
        }
        // Some write endpoints answer with an empty body.
        let text = response.text().await.map_err(MetadataError::RestRequest)?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}
