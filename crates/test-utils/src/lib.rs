//! Mock collaborators shared by the `docmeta` test suites.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use docmeta::errors::MetadataError;
use docmeta::extraction::{
    DocumentLocation, ExtractionRequest, ExtractionResponse, ExtractionResult,
};
use docmeta::fields::Term;
use docmeta::services::{LlmExtractor, RestClient, TaxonomyLookup};

/// A recorded call made through [`MockRestClient`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: &'static str,
    pub url: String,
    pub body: Value,
}

/// A [`RestClient`] that replays canned responses and records every call.
///
/// Responses are keyed by a URL substring; the first matching key wins.
/// Unmatched URLs answer with a 404-shaped error so tests fail loudly.
#[derive(Clone, Default)]
pub struct MockRestClient {
    responses: Arc<Mutex<Vec<(String, Value)>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockRestClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-programs a response for any URL containing `url_part`.
    pub fn add_response(&self, url_part: &str, response: Value) {
        self.responses
            .lock()
            .unwrap()
            .push((url_part.to_string(), response));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn respond(&self, method: &'static str, url: &str, body: Value) -> Result<Value, MetadataError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            url: url.to_string(),
            body,
        });
        let responses = self.responses.lock().unwrap();
        for (part, response) in responses.iter() {
            if url.contains(part.as_str()) {
                return Ok(response.clone());
            }
        }
        Err(MetadataError::Api {
            status: 404,
            body: format!("no canned response for {url}"),
        })
    }
}

#[async_trait]
impl RestClient for MockRestClient {
    async fn get_json(&self, url: &str) -> Result<Value, MetadataError> {
        self.respond("GET", url, Value::Null)
    }

    async fn post_json(
        &self,
        url: &str,
        body: &Value,
        _headers: &[(&str, &str)],
    ) -> Result<Value, MetadataError> {
        self.respond("POST", url, body.clone())
    }
}

/// A [`TaxonomyLookup`] serving terms from a fixed map, keyed by term set id.
/// Unknown term sets resolve to an empty list, like the real service under
/// failure.
#[derive(Clone, Default)]
pub struct MockTaxonomyLookup {
    terms: HashMap<String, Vec<Term>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockTaxonomyLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_terms(mut self, term_set_id: &str, terms: Vec<Term>) -> Self {
        self.terms.insert(term_set_id.to_string(), terms);
        self
    }

    /// Term set ids requested so far.
    pub fn requested(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaxonomyLookup for MockTaxonomyLookup {
    async fn get_terms(&self, term_set_id: &str, _site_url: &str) -> Vec<Term> {
        self.calls.lock().unwrap().push(term_set_id.to_string());
        self.terms.get(term_set_id).cloned().unwrap_or_default()
    }
}

/// An [`LlmExtractor`] that replays scripted results and records requests.
#[derive(Clone, Default)]
pub struct ScriptedExtractor {
    results: Vec<ExtractionResult>,
    requests: Arc<Mutex<Vec<ExtractionRequest>>>,
}

impl ScriptedExtractor {
    pub fn new(results: Vec<ExtractionResult>) -> Self {
        Self {
            results,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<ExtractionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmExtractor for ScriptedExtractor {
    async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<ExtractionResponse, MetadataError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(ExtractionResponse {
            document: request.document.clone(),
            results: self.results.clone(),
        })
    }
}

/// Convenience constructor for a drive-located document echo.
pub fn drive_location(drive_id: &str, drive_item_id: &str) -> DocumentLocation {
    DocumentLocation::Drive {
        drive_id: drive_id.to_string(),
        drive_item_id: drive_item_id.to_string(),
    }
}
