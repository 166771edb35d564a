//! # Field Factory
//!
//! Builds typed [`Field`] instances from a wire [`FieldSchema`] and the raw
//! value returned by the list-rendering query. Construction is async only
//! because taxonomy fields fetch their term list on demand; a term-store
//! outage yields an empty term list and never blocks construction.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::debug;

use crate::fields::{Field, FieldKind, FieldSchema, TaxonomyValue};
use crate::services::TaxonomyLookup;

pub struct FieldFactory {
    taxonomy: Arc<dyn TaxonomyLookup>,
}

impl FieldFactory {
    pub fn new(taxonomy: Arc<dyn TaxonomyLookup>) -> Self {
        Self { taxonomy }
    }

    /// Constructs the typed field for a schema, dispatching on
    /// `TypeAsString`. Unknown types become [`FieldKind::Unsupported`],
    /// which retains the raw value and type name for diagnostics.
    pub async fn create_field(&self, schema: &FieldSchema, raw: &Value, site_url: &str) -> Field {
        let kind = match schema.type_as_string.as_str() {
            "Text" | "Note" => FieldKind::String {
                value: value_as_string(raw),
                max_length: None,
            },
            "Choice" => FieldKind::Choice {
                value: value_as_string(raw),
                choices: parse_choices(schema),
            },
            "MultiChoice" => FieldKind::MultiChoice {
                value: parse_multi_choice_value(raw),
                choices: parse_choices(schema),
            },
            "TaxonomyFieldType" => FieldKind::Taxonomy {
                value: parse_taxonomy_value(raw),
                term_set_id: schema.term_set_id.clone().unwrap_or_default(),
                terms: self.fetch_terms(schema, site_url).await,
            },
            "TaxonomyFieldTypeMulti" => FieldKind::TaxonomyMulti {
                value: parse_taxonomy_multi_value(raw),
                term_set_id: schema.term_set_id.clone().unwrap_or_default(),
                terms: self.fetch_terms(schema, site_url).await,
            },
            "Number" | "Currency" => FieldKind::Numeric {
                value: value_as_number(raw),
            },
            "Boolean" => FieldKind::Boolean {
                value: value_as_bool(raw),
            },
            "DateTime" => FieldKind::DateTime {
                value: parse_date_time(raw),
                includes_time: schema.display_format == Some(1),
            },
            other => {
                debug!("Field '{}' has unsupported type '{other}'", schema.internal_name);
                FieldKind::Unsupported {
                    value: raw.clone(),
                    original_type: other.to_string(),
                }
            }
        };

        Field::new(
            schema.id.clone(),
            schema.internal_name.clone(),
            schema.title.clone(),
            schema.description.clone(),
            schema.required,
            kind,
        )
    }

    /// Terms are fetched only when the schema carries both a term set and a
    /// term store id; otherwise the field is built with an empty vocabulary.
    async fn fetch_terms(&self, schema: &FieldSchema, site_url: &str) -> Vec<crate::fields::Term> {
        match (&schema.term_set_id, &schema.ssp_id) {
            (Some(term_set_id), Some(ssp_id))
                if !term_set_id.is_empty() && !ssp_id.is_empty() =>
            {
                self.taxonomy.get_terms(term_set_id, site_url).await
            }
            _ => Vec::new(),
        }
    }
}

fn parse_choices(schema: &FieldSchema) -> Vec<String> {
    schema
        .choices
        .clone()
        .map(|c| c.into_vec())
        .unwrap_or_default()
}

fn value_as_string(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Numbers arrive either as JSON numbers (item GET) or as rendered strings
/// (list-rendering query).
fn value_as_number(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}

/// Booleans arrive as JSON booleans or as the rendered "Yes"/"No" strings.
fn value_as_bool(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "yes" | "true" | "1" => Some(true),
            "no" | "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// MultiChoice values arrive either as an array of strings or in the
/// `";#a;#b;#"` string encoding. Empty after filtering parses to `None`.
fn parse_multi_choice_value(raw: &Value) -> Option<Vec<String>> {
    let parts: Vec<String> = match raw {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Value::String(s) => s
            .split(";#")
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect(),
        _ => return None,
    };
    if parts.is_empty() {
        None
    } else {
        Some(parts)
    }
}

/// A single taxonomy value arrives either as a `{Label, TermID}` object or
/// as an array (the first element wins).
fn parse_taxonomy_value(raw: &Value) -> Option<TaxonomyValue> {
    match raw {
        Value::Array(items) => items.first().and_then(parse_taxonomy_object),
        Value::Object(_) => parse_taxonomy_object(raw),
        _ => None,
    }
}

fn parse_taxonomy_multi_value(raw: &Value) -> Option<Vec<TaxonomyValue>> {
    let items = raw.as_array()?;
    let parsed: Vec<TaxonomyValue> = items.iter().filter_map(parse_taxonomy_object).collect();
    if parsed.is_empty() {
        None
    } else {
        Some(parsed)
    }
}

/// The list-rendering query spells the GUID key `TermID`; the item endpoint
/// spells it `TermGuid`. Both are accepted.
fn parse_taxonomy_object(raw: &Value) -> Option<TaxonomyValue> {
    let obj = raw.as_object()?;
    let label = obj.get("Label")?.as_str()?.to_string();
    let term_guid = obj
        .get("TermID")
        .or_else(|| obj.get("TermGuid"))?
        .as_str()?
        .to_string();
    if label.is_empty() || term_guid.is_empty() {
        return None;
    }
    Some(TaxonomyValue {
        term_guid,
        label,
        wss_id: obj.get("WssId").and_then(Value::as_i64),
    })
}

fn parse_date_time(raw: &Value) -> Option<DateTime<Utc>> {
    let s = raw.as_str()?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    None
}
