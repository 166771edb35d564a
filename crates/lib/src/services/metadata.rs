//! # Metadata Orchestration
//!
//! Loads the editable field schemas for a document's content type, loads the
//! item's current values through a single list-rendering query (which, unlike
//! a plain item GET, returns taxonomy values pre-resolved to label/term-id
//! pairs), merges both into typed fields, and posts accepted values back
//! through the validate-update endpoint.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::context::DocumentContext;
use crate::errors::MetadataError;
use crate::fields::{CandidateValue, Field, FieldFactory, FieldSchema, RestCollection};
use crate::services::{RestClient, TaxonomyLookup};

/// Schema properties requested from the content-type fields endpoint.
const SCHEMA_SELECT: [&str; 11] = [
    "Id",
    "InternalName",
    "Title",
    "Description",
    "TypeAsString",
    "Required",
    "ReadOnlyField",
    "Choices",
    "DisplayFormat",
    "TermSetId",
    "SspId",
];

/// System and audit fields that are never offered for extraction, even when
/// the content type exposes them as editable.
pub const DEFAULT_EXCLUDED_FIELDS: [&str; 13] = [
    "ContentType",
    "Title",
    "LinkFilename",
    "FileLeafRef",
    "Modified",
    "Created",
    "Author",
    "Created_x0020_By",
    "Editor",
    "Modified_x0020_By",
    "RatingCount",
    "AverageRating",
    "LikesCount",
];

#[derive(Debug, Clone)]
pub struct MetadataServiceConfig {
    /// Internal names excluded from `load_fields`, on top of the read-only,
    /// hidden and underscore-prefixed filters.
    pub excluded_fields: Vec<String>,
}

impl Default for MetadataServiceConfig {
    fn default() -> Self {
        Self {
            excluded_fields: DEFAULT_EXCLUDED_FIELDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// A value accepted for write-back, keyed by the field's internal name.
/// `None` submits the literal string `"null"` (see `apply_field_values`).
#[derive(Debug, Clone)]
pub struct FieldValueUpdate {
    pub internal_name: String,
    pub value: Option<CandidateValue>,
}

pub struct MetadataService {
    client: Arc<dyn RestClient>,
    factory: FieldFactory,
    config: MetadataServiceConfig,
}

#[derive(Debug, Deserialize)]
struct RenderListDataResponse {
    #[serde(rename = "Row", default)]
    row: Vec<Map<String, Value>>,
}

impl MetadataService {
    pub fn new(client: Arc<dyn RestClient>, taxonomy: Arc<dyn TaxonomyLookup>) -> Self {
        Self::with_config(client, taxonomy, MetadataServiceConfig::default())
    }

    pub fn with_config(
        client: Arc<dyn RestClient>,
        taxonomy: Arc<dyn TaxonomyLookup>,
        config: MetadataServiceConfig,
    ) -> Self {
        Self {
            client,
            factory: FieldFactory::new(taxonomy),
            config,
        }
    }

    /// Loads the editable fields of the document's content type, populated
    /// with the item's current values.
    pub async fn load_fields(
        &self,
        document: &DocumentContext,
    ) -> Result<Vec<Field>, MetadataError> {
        info!(
            "Loading fields for item {} in list {}",
            document.item_id, document.list_id
        );
        let schemas = self.get_field_schemas(document).await?;
        let values = self.get_field_values(document, &schemas).await?;

        // Term fetches for independent taxonomy fields run concurrently;
        // the whole batch resolves before the field list is returned.
        let fields = futures::future::join_all(schemas.iter().map(|schema| {
            let raw = values
                .get(&schema.internal_name)
                .cloned()
                .unwrap_or(Value::Null);
            let web_url = document.web_url.clone();
            async move { self.factory.create_field(schema, &raw, &web_url).await }
        }))
        .await;

        debug!("Built {} fields", fields.len());
        Ok(fields)
    }

    /// Posts accepted values through `ValidateUpdateListItem()`.
    ///
    /// Every value is submitted as a string; a `None` value submits the
    /// literal string `"null"`. That is how the backend endpoint behaves
    /// today and callers rely on it, so it is preserved as-is.
    pub async fn apply_field_values(
        &self,
        document: &DocumentContext,
        updates: &[FieldValueUpdate],
    ) -> Result<(), MetadataError> {
        let url = format!(
            "{}/_api/web/lists(guid'{}')/items({})/ValidateUpdateListItem()",
            document.web_url, document.list_id, document.item_id
        );

        let form_values: Vec<Value> = updates
            .iter()
            .map(|update| {
                json!({
                    "FieldName": update.internal_name,
                    "FieldValue": match &update.value {
                        Some(value) => value.to_string(),
                        None => "null".to_string(),
                    },
                })
            })
            .collect();

        info!(
            "Applying {} field values to item {}",
            form_values.len(),
            document.item_id
        );
        self.client
            .post_json(&url, &json!({ "formValues": form_values }), &[])
            .await?;
        Ok(())
    }

    async fn get_field_schemas(
        &self,
        document: &DocumentContext,
    ) -> Result<Vec<FieldSchema>, MetadataError> {
        let url = format!(
            "{}/_api/web/lists(guid'{}')/contenttypes('{}')/fields?$filter=Hidden eq false&$select={}",
            document.web_url,
            document.list_id,
            document.content_type_id,
            SCHEMA_SELECT.join(","),
        );

        let raw = self.client.get_json(&url).await?;
        let response: RestCollection<FieldSchema> = serde_json::from_value(raw)?;

        Ok(response
            .value
            .into_iter()
            .filter(|schema| {
                !schema.read_only_field
                    && !schema.internal_name.starts_with('_')
                    && !self
                        .config
                        .excluded_fields
                        .iter()
                        .any(|excluded| excluded == &schema.internal_name)
            })
            .collect())
    }

    /// Fetches current values via `RenderListDataAsStream`, scoped to the
    /// item by a CAML equality filter on `ID`. Missing rows resolve every
    /// field to null.
    async fn get_field_values(
        &self,
        document: &DocumentContext,
        schemas: &[FieldSchema],
    ) -> Result<Map<String, Value>, MetadataError> {
        if schemas.is_empty() {
            return Ok(Map::new());
        }

        let view_fields: String = schemas
            .iter()
            .map(|s| format!("<FieldRef Name=\"{}\" />", s.internal_name))
            .collect();
        let view_xml = format!(
            "<View Scope=\"RecursiveAll\">\
             <ViewFields>{view_fields}</ViewFields>\
             <Query><Where><Eq><FieldRef Name=\"ID\" />\
             <Value Type=\"Counter\">{}</Value></Eq></Where></Query>\
             <RowLimit Paged=\"TRUE\">1</RowLimit>\
             </View>",
            document.item_id
        );

        let url = format!(
            "{}/_api/web/lists(guid'{}')/RenderListDataAsStream",
            document.web_url, document.list_id
        );
        let body = json!({
            "parameters": {
                "RenderOptions": 2,
                "ViewXml": view_xml,
            }
        });
        let headers = [
            ("Accept", "application/json;odata=nometadata"),
            ("Content-Type", "application/json;odata=nometadata"),
        ];

        let raw = self.client.post_json(&url, &body, &headers).await?;
        let response: RenderListDataResponse = serde_json::from_value(raw)?;

        Ok(response.row.into_iter().next().unwrap_or_default())
    }
}
