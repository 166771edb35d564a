//! # Extraction-Field Wrapper
//!
//! Wraps a [`Field`] with the per-session extraction configuration: the
//! inferred (and user-overridable) extraction type, the LLM-facing
//! description, and the result of the last extraction run.
//!
//! The hosting panel re-renders on every state change, so the wrapper is an
//! immutable value type: every update goes through a pure `with_*` function
//! that returns a fresh instance, keeping each render's snapshot isolated.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::DocumentContext;
use crate::fields::{CandidateValue, Field, FieldKind};

/// Confidence level reported by the extraction service for one result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Red,
    Yellow,
    Green,
}

/// The simple data types the extraction service can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionType {
    String,
    Number,
    Boolean,
}

/// A field plus its extraction-session state. The wrapped field is shared
/// and immutable; all wrapper state is replaced through `with_*` updates.
#[derive(Debug, Clone)]
pub struct ExtractionField {
    field: Arc<Field>,
    pub extraction_type: ExtractionType,
    pub description: String,
    pub extracted_value: Option<CandidateValue>,
    pub confidence: Option<Confidence>,
}

impl ExtractionField {
    /// Wraps a field, inferring the extraction type from its kind and
    /// building the default LLM description from the field's own
    /// description plus a kind-specific hint.
    pub fn new(field: Arc<Field>) -> Self {
        let extraction_type = infer_extraction_type(&field);
        let description = build_description(&field);
        Self {
            field,
            extraction_type,
            description,
            extracted_value: None,
            confidence: None,
        }
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn with_extraction_type(mut self, extraction_type: ExtractionType) -> Self {
        self.extraction_type = extraction_type;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Records the result of an extraction run.
    pub fn with_result(
        mut self,
        value: Option<CandidateValue>,
        confidence: Option<Confidence>,
    ) -> Self {
        self.extracted_value = value;
        self.confidence = confidence;
        self
    }

    /// Resets the extraction result; called at the start of each run.
    pub fn cleared(self) -> Self {
        self.with_result(None, None)
    }

    /// The request-schema entry for this field. Results come back matched
    /// by `title`, not `internal_name` — a contract of the extraction
    /// service boundary.
    pub fn to_schema(&self) -> ExtractionFieldSchema {
        ExtractionFieldSchema {
            internal_name: self.field.internal_name.clone(),
            title: self.field.title.clone(),
            description: self.description.clone(),
            data_type: self.extraction_type,
        }
    }

    /// True only when a value was extracted, the confidence is known and
    /// not red, and the wrapped field accepts the value.
    pub fn can_apply(&self) -> bool {
        let Some(value) = &self.extracted_value else {
            return false;
        };
        match self.confidence {
            None | Some(Confidence::Red) => false,
            Some(_) => self.field.is_valid_extracted_value(value),
        }
    }

    /// The write-path value for the extracted result, or `None` when
    /// nothing was extracted.
    pub fn resolve_value_for_apply(&self) -> Option<CandidateValue> {
        self.extracted_value
            .as_ref()
            .map(|v| self.field.resolve_value_for_apply(v))
    }
}

/// Builds the batch extraction request for a document. The document is
/// located by its Graph drive ids when present, falling back to the
/// server-relative path.
pub fn build_extraction_request(
    document: &DocumentContext,
    fields: &[ExtractionField],
) -> ExtractionRequest {
    let location = if !document.drive_id.is_empty() && !document.drive_item_id.is_empty() {
        DocumentLocation::Drive {
            drive_id: document.drive_id.clone(),
            drive_item_id: document.drive_item_id.clone(),
        }
    } else {
        DocumentLocation::Path {
            path: document.server_relative_url.clone(),
        }
    };
    ExtractionRequest {
        document: location,
        fields: fields.iter().map(ExtractionField::to_schema).collect(),
    }
}

/// Merges a service response into a fresh snapshot of the field list.
/// Results are matched by `field_name == field.title`; fields without a
/// result come back cleared.
pub fn apply_results(
    fields: &[ExtractionField],
    response: &ExtractionResponse,
) -> Vec<ExtractionField> {
    fields
        .iter()
        .map(|ef| {
            let result = response
                .results
                .iter()
                .find(|r| r.field_name == ef.field().title);
            match result {
                Some(r) => ef
                    .clone()
                    .with_result(r.value.clone(), Some(r.confidence)),
                None => ef.clone().cleared(),
            }
        })
        .collect()
}

fn infer_extraction_type(field: &Field) -> ExtractionType {
    match field.kind {
        FieldKind::Numeric { .. } => ExtractionType::Number,
        FieldKind::Boolean { .. } => ExtractionType::Boolean,
        _ => ExtractionType::String,
    }
}

fn build_description(field: &Field) -> String {
    let mut parts: Vec<String> = Vec::new();
    if !field.description.is_empty() {
        parts.push(field.description.clone());
    }
    let hint = extraction_hint(field);
    if !hint.is_empty() {
        parts.push(hint);
    }
    parts.join(". ")
}

/// Kind-specific guidance appended to the LLM description.
fn extraction_hint(field: &Field) -> String {
    match &field.kind {
        FieldKind::DateTime { includes_time, .. } => {
            if *includes_time {
                "Return as ISO 8601 date and time (e.g. 2025-01-15T14:30:00Z)".to_string()
            } else {
                "Return as ISO 8601 date (e.g. 2025-01-15)".to_string()
            }
        }
        FieldKind::Choice { choices, .. } => {
            format!("Value must be one of: [{}]", quote_join(choices.iter()))
        }
        FieldKind::MultiChoice { choices, .. } => {
            format!("Select one or more from: [{}]", quote_join(choices.iter()))
        }
        FieldKind::Taxonomy { terms, .. } => format!(
            "Value must be one of: [{}]",
            quote_join(terms.iter().map(|t| &t.label))
        ),
        FieldKind::TaxonomyMulti { terms, .. } => format!(
            "Select one or more from: [{}]",
            quote_join(terms.iter().map(|t| &t.label))
        ),
        FieldKind::Boolean { .. } => "Return as true or false".to_string(),
        FieldKind::Numeric { .. } => "Return as a number".to_string(),
        FieldKind::String { .. } | FieldKind::Unsupported { .. } => String::new(),
    }
}

fn quote_join<'a>(items: impl Iterator<Item = &'a String>) -> String {
    items
        .map(|i| format!("\"{i}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

// --- Extraction service wire types ---

/// One field entry in the extraction request schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionFieldSchema {
    /// Internal name, used to map accepted values back to list fields.
    pub internal_name: String,
    /// Field title; the service echoes this back as `fieldName`.
    pub title: String,
    /// Instructions for the LLM on how to extract this field.
    pub description: String,
    pub data_type: ExtractionType,
}

/// Where the service should read the document from: Graph drive ids when
/// known, otherwise a server-relative path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentLocation {
    #[serde(rename_all = "camelCase")]
    Drive {
        drive_id: String,
        drive_item_id: String,
    },
    Path { path: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRequest {
    pub document: DocumentLocation,
    pub fields: Vec<ExtractionFieldSchema>,
}

/// A single per-field result from the extraction service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Matches the `title` sent in the request schema.
    pub field_name: String,
    pub confidence: Confidence,
    pub value: Option<CandidateValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResponse {
    pub document: DocumentLocation,
    pub results: Vec<ExtractionResult>,
}
