//! Term-store lookup seam and its REST implementation.
//!
//! Lookup failures are absorbed here: a field with an empty vocabulary still
//! renders and still resolves free-text labels, it just cannot validate
//! extracted terms. Construction of taxonomy fields must never be blocked by
//! a term-store outage.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::fields::Term;
use crate::services::RestClient;

/// Resolves the terms of a term set. Returns an empty list on any failure.
#[async_trait]
pub trait TaxonomyLookup: Send + Sync {
    async fn get_terms(&self, term_set_id: &str, site_url: &str) -> Vec<Term>;
}

#[derive(Debug, Clone, Deserialize)]
struct TermStoreResponse {
    value: Vec<TermStoreTerm>,
}

#[derive(Debug, Clone, Deserialize)]
struct TermStoreTerm {
    id: String,
    #[serde(default)]
    labels: Vec<TermStoreLabel>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TermStoreLabel {
    name: String,
    #[serde(default)]
    is_default: bool,
}

/// Fetches terms from the v2.1 term-store endpoint.
pub struct TaxonomyService {
    client: Arc<dyn RestClient>,
}

impl TaxonomyService {
    pub fn new(client: Arc<dyn RestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TaxonomyLookup for TaxonomyService {
    async fn get_terms(&self, term_set_id: &str, site_url: &str) -> Vec<Term> {
        let url = format!("{site_url}/_api/v2.1/termStore/sets/{term_set_id}/terms");

        let raw = match self.client.get_json(&url).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to load terms for term set {term_set_id}: {e}");
                return Vec::new();
            }
        };

        let response: TermStoreResponse = match serde_json::from_value(raw) {
            Ok(response) => response,
            Err(e) => {
                warn!("Unexpected term-store response for term set {term_set_id}: {e}");
                return Vec::new();
            }
        };

        response
            .value
            .into_iter()
            .map(|term| Term {
                label: default_label(&term.labels),
                term_guid: term.id,
            })
            .collect()
    }
}

/// The default-language label, falling back to the first label.
fn default_label(labels: &[TermStoreLabel]) -> String {
    labels
        .iter()
        .find(|l| l.is_default)
        .or_else(|| labels.first())
        .map(|l| l.name.clone())
        .unwrap_or_default()
}
