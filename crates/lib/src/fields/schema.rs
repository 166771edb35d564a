//! Wire models for the SharePoint field-schema REST responses.

use serde::Deserialize;

/// A collection response (`{"value": [...]}`) from the REST API with
/// `odata=nometadata`.
#[derive(Debug, Clone, Deserialize)]
pub struct RestCollection<T> {
    pub value: Vec<T>,
}

/// A field schema as returned by the content-type fields endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FieldSchema {
    pub id: String,
    pub internal_name: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub type_as_string: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub read_only_field: bool,
    #[serde(default)]
    pub hidden: bool,
    /// Present for Choice/MultiChoice fields.
    #[serde(default)]
    pub choices: Option<ChoicesWire>,
    /// Present for DateTime fields: 0 = date only, 1 = date and time.
    #[serde(default)]
    pub display_format: Option<i64>,
    /// Present for taxonomy fields.
    #[serde(default)]
    pub term_set_id: Option<String>,
    #[serde(default)]
    pub ssp_id: Option<String>,
}

/// Choice lists arrive either as a flat array (`odata=nometadata`) or
/// wrapped in `{"results": [...]}` (verbose OData).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChoicesWire {
    Flat(Vec<String>),
    Verbose { results: Vec<String> },
}

impl ChoicesWire {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            ChoicesWire::Flat(v) => v,
            ChoicesWire::Verbose { results } => results,
        }
    }
}
