//! # Typed Field Model
//!
//! This module models SharePoint list-item fields as a closed set of typed
//! variants. Each variant knows how to format itself for display, how to
//! serialize into the REST write shape, whether an extracted candidate value
//! is acceptable, and how to resolve an accepted candidate into the string
//! the `ValidateUpdateListItem` write path expects.

pub mod factory;
pub mod schema;

pub use factory::FieldFactory;
pub use schema::{ChoicesWire, FieldSchema, RestCollection};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// A term available in a term set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub term_guid: String,
    pub label: String,
}

/// A taxonomy term value with its GUID, as stored on a list item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyValue {
    pub term_guid: String,
    pub label: String,
    pub wss_id: Option<i64>,
}

/// A scalar value produced by the extraction service.
///
/// Stringification follows the conventions of the extraction API: numbers
/// render without a trailing `.0` and booleans as `true`/`false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CandidateValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl fmt::Display for CandidateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateValue::Text(s) => write!(f, "{s}"),
            CandidateValue::Number(n) => write!(f, "{n}"),
            CandidateValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for CandidateValue {
    fn from(s: &str) -> Self {
        CandidateValue::Text(s.to_string())
    }
}

/// The kind-specific payload of a field: its current value plus the
/// constraints that govern validation and write-back.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String {
        value: Option<String>,
        max_length: Option<usize>,
    },
    Choice {
        value: Option<String>,
        choices: Vec<String>,
    },
    MultiChoice {
        value: Option<Vec<String>>,
        choices: Vec<String>,
    },
    Taxonomy {
        value: Option<TaxonomyValue>,
        term_set_id: String,
        terms: Vec<Term>,
    },
    TaxonomyMulti {
        value: Option<Vec<TaxonomyValue>>,
        term_set_id: String,
        terms: Vec<Term>,
    },
    Numeric {
        value: Option<f64>,
    },
    Boolean {
        value: Option<bool>,
    },
    DateTime {
        value: Option<chrono::DateTime<chrono::Utc>>,
        includes_time: bool,
    },
    /// A field type this tool does not handle. The raw value and the
    /// original `TypeAsString` are retained for diagnostics; the field is
    /// never written back.
    Unsupported {
        value: Value,
        original_type: String,
    },
}

/// A SharePoint list-item field: shared identity plus a typed payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub id: String,
    pub internal_name: String,
    pub title: String,
    pub description: String,
    pub is_required: bool,
    pub kind: FieldKind,
}

impl Field {
    pub fn new(
        id: impl Into<String>,
        internal_name: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        is_required: bool,
        kind: FieldKind,
    ) -> Self {
        Self {
            id: id.into(),
            internal_name: internal_name.into(),
            title: title.into(),
            description: description.into(),
            is_required,
            kind,
        }
    }

    /// Formats the current value for display. Never fails: empty values
    /// render as `"(empty)"`.
    pub fn format_for_display(&self) -> String {
        const EMPTY: &str = "(empty)";
        match &self.kind {
            FieldKind::String { value, .. } => value.clone().unwrap_or_else(|| EMPTY.to_string()),
            FieldKind::Choice { value, .. } => value.clone().unwrap_or_else(|| EMPTY.to_string()),
            FieldKind::MultiChoice { value, .. } => match value {
                Some(v) if !v.is_empty() => v.join(", "),
                _ => EMPTY.to_string(),
            },
            FieldKind::Taxonomy { value, .. } => value
                .as_ref()
                .map(|v| v.label.clone())
                .unwrap_or_else(|| EMPTY.to_string()),
            FieldKind::TaxonomyMulti { value, .. } => match value {
                Some(v) if !v.is_empty() => v
                    .iter()
                    .map(|t| t.label.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                _ => EMPTY.to_string(),
            },
            FieldKind::Numeric { value } => value
                .map(|n| n.to_string())
                .unwrap_or_else(|| EMPTY.to_string()),
            FieldKind::Boolean { value } => match value {
                Some(true) => "Yes".to_string(),
                Some(false) => "No".to_string(),
                None => EMPTY.to_string(),
            },
            FieldKind::DateTime {
                value,
                includes_time,
            } => match value {
                Some(dt) if *includes_time => dt.format("%Y-%m-%d %H:%M").to_string(),
                Some(dt) => dt.format("%Y-%m-%d").to_string(),
                None => EMPTY.to_string(),
            },
            FieldKind::Unsupported {
                value,
                original_type,
            } => {
                if value.is_null() {
                    EMPTY.to_string()
                } else {
                    format!("[{original_type}]")
                }
            }
        }
    }

    /// Serializes the current value into the shape the REST API expects for
    /// a direct field write. Empty values serialize to JSON null, as do
    /// empty multi-valued lists. Unsupported fields always serialize to
    /// null so they can never be written back.
    pub fn serialize_for_sharepoint(&self) -> Value {
        match &self.kind {
            FieldKind::String { value, .. } | FieldKind::Choice { value, .. } => {
                value.as_ref().map(|v| json!(v)).unwrap_or(Value::Null)
            }
            FieldKind::MultiChoice { value, .. } => match value {
                // SharePoint expects ";#value1;#value2;#" for multi-choice.
                Some(v) if !v.is_empty() => json!(format!(";#{};#", v.join(";#"))),
                _ => Value::Null,
            },
            FieldKind::Taxonomy { value, .. } => value
                .as_ref()
                .map(taxonomy_write_shape)
                .unwrap_or(Value::Null),
            FieldKind::TaxonomyMulti { value, .. } => match value {
                Some(v) if !v.is_empty() => {
                    Value::Array(v.iter().map(taxonomy_write_shape).collect())
                }
                _ => Value::Null,
            },
            FieldKind::Numeric { value } => value.map(|n| json!(n)).unwrap_or(Value::Null),
            FieldKind::Boolean { value } => value.map(|b| json!(b)).unwrap_or(Value::Null),
            FieldKind::DateTime {
                value,
                includes_time,
            } => match value {
                Some(dt) if *includes_time => {
                    json!(dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
                }
                Some(dt) => json!(dt.format("%Y-%m-%d").to_string()),
                None => Value::Null,
            },
            FieldKind::Unsupported { .. } => Value::Null,
        }
    }

    /// Decides whether a candidate value produced by the extraction service
    /// is acceptable for this field.
    ///
    /// Choice and taxonomy variants require a case-insensitive whole-token
    /// match against the known choices/terms; the multi-valued variants
    /// require every comma-separated token to match. String fields enforce
    /// `max_length` when configured. Numeric, boolean and date fields accept
    /// anything (the backend validates on write). Unsupported fields accept
    /// anything too, but are filtered out upstream because they can never be
    /// applied.
    pub fn is_valid_extracted_value(&self, candidate: &CandidateValue) -> bool {
        match &self.kind {
            FieldKind::String { max_length, .. } => match max_length {
                Some(max) => candidate.to_string().chars().count() <= *max,
                None => true,
            },
            FieldKind::Choice { choices, .. } => {
                let label = candidate.to_string();
                contains_ignore_case(choices.iter().map(String::as_str), label.trim())
            }
            FieldKind::MultiChoice { choices, .. } => {
                split_tokens(&candidate.to_string())
                    .iter()
                    .all(|token| contains_ignore_case(choices.iter().map(String::as_str), token))
            }
            FieldKind::Taxonomy { terms, .. } => {
                let label = candidate.to_string();
                contains_ignore_case(terms.iter().map(|t| t.label.as_str()), label.trim())
            }
            FieldKind::TaxonomyMulti { terms, .. } => {
                split_tokens(&candidate.to_string()).iter().all(|token| {
                    contains_ignore_case(terms.iter().map(|t| t.label.as_str()), token)
                })
            }
            FieldKind::Numeric { .. }
            | FieldKind::Boolean { .. }
            | FieldKind::DateTime { .. }
            | FieldKind::Unsupported { .. } => true,
        }
    }

    /// Resolves an accepted candidate into the literal value submitted
    /// through the validate-update write path.
    ///
    /// Taxonomy labels resolve to `"Label|TermGuid"` using the matched
    /// term's canonical casing; labels with no matching term pass through
    /// raw. Multi-valued taxonomy resolves each comma-separated token
    /// independently and joins with `;#`. Everything else passes the
    /// candidate through unchanged.
    pub fn resolve_value_for_apply(&self, candidate: &CandidateValue) -> CandidateValue {
        match &self.kind {
            FieldKind::Taxonomy { terms, .. } => {
                let label = candidate.to_string();
                CandidateValue::Text(resolve_term_token(terms, label.trim()))
            }
            FieldKind::TaxonomyMulti { terms, .. } => {
                let resolved: Vec<String> = split_tokens(&candidate.to_string())
                    .iter()
                    .map(|t| resolve_term_token(terms, t))
                    .collect();
                CandidateValue::Text(resolved.join(";#"))
            }
            _ => candidate.clone(),
        }
    }

    /// True when the field kind is one the extraction service can fill.
    pub fn is_extractable(&self) -> bool {
        !matches!(self.kind, FieldKind::Unsupported { .. })
    }
}

/// The tagged write shape the REST API expects for a taxonomy value.
fn taxonomy_write_shape(v: &TaxonomyValue) -> Value {
    json!({
        "__metadata": { "type": "SP.Taxonomy.TaxonomyFieldValue" },
        "Label": v.label,
        "TermGuid": v.term_guid,
        "WssId": v.wss_id.unwrap_or(-1),
    })
}

/// Splits a multi-valued candidate into trimmed, non-empty tokens.
fn split_tokens(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn contains_ignore_case<'a>(mut haystack: impl Iterator<Item = &'a str>, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    haystack.any(|h| h.to_lowercase() == needle)
}

fn resolve_term_token(terms: &[Term], token: &str) -> String {
    let lowered = token.to_lowercase();
    match terms.iter().find(|t| t.label.to_lowercase() == lowered) {
        Some(term) => format!("{}|{}", term.label, term.term_guid),
        None => token.to_string(),
    }
}
