//! Tests for the metadata orchestration service: schema filtering, the
//! list-rendering value query, field construction, and write-back.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use common::{setup_tracing, term};
use docmeta::context::{DocumentContext, RowInput};
use docmeta::fields::{CandidateValue, FieldKind};
use docmeta::services::{FieldValueUpdate, MetadataService, MetadataServiceConfig};
use docmeta_test_utils::{MockRestClient, MockTaxonomyLookup};
use serde_json::json;

fn document() -> DocumentContext {
    let mut row_values = HashMap::new();
    row_values.insert("ID".to_string(), "42".to_string());
    row_values.insert("ContentTypeId".to_string(), "0x0101".to_string());
    DocumentContext::from_row(&RowInput {
        row_values,
        web_url: "https://contoso.sharepoint.com/sites/TestSite".to_string(),
        list_id: "L".to_string(),
        ..Default::default()
    })
}

fn service(client: &MockRestClient, taxonomy: &MockTaxonomyLookup) -> MetadataService {
    MetadataService::new(Arc::new(client.clone()), Arc::new(taxonomy.clone()))
}

fn schema_entry(internal_name: &str, type_as_string: &str) -> serde_json::Value {
    json!({
        "Id": format!("{internal_name}-id"),
        "InternalName": internal_name,
        "Title": internal_name,
        "Description": "",
        "TypeAsString": type_as_string,
        "Required": false,
        "ReadOnlyField": false,
        "Hidden": false,
    })
}

#[tokio::test]
async fn apply_posts_to_the_validate_update_endpoint() {
    setup_tracing();
    let client = MockRestClient::new();
    client.add_response("ValidateUpdateListItem", json!({"value": []}));
    let service = service(&client, &MockTaxonomyLookup::new());

    service
        .apply_field_values(
            &document(),
            &[FieldValueUpdate {
                internal_name: "Status".to_string(),
                value: Some(CandidateValue::from("Draft")),
            }],
        )
        .await
        .unwrap();

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].url,
        "https://contoso.sharepoint.com/sites/TestSite/_api/web/lists(guid'L')/items(42)/ValidateUpdateListItem()"
    );
    assert_eq!(
        calls[0].body,
        json!({"formValues": [{"FieldName": "Status", "FieldValue": "Draft"}]})
    );
}

#[tokio::test]
async fn apply_stringifies_every_value_including_null() {
    let client = MockRestClient::new();
    client.add_response("ValidateUpdateListItem", json!({"value": []}));
    let service = service(&client, &MockTaxonomyLookup::new());

    service
        .apply_field_values(
            &document(),
            &[
                FieldValueUpdate {
                    internal_name: "Pages".to_string(),
                    value: Some(CandidateValue::Number(12.0)),
                },
                FieldValueUpdate {
                    internal_name: "Approved".to_string(),
                    value: Some(CandidateValue::Bool(true)),
                },
                // The backend receives the literal string "null"; preserved
                // endpoint behavior, not a bug.
                FieldValueUpdate {
                    internal_name: "Notes".to_string(),
                    value: None,
                },
            ],
        )
        .await
        .unwrap();

    assert_eq!(
        client.calls()[0].body,
        json!({"formValues": [
            {"FieldName": "Pages", "FieldValue": "12"},
            {"FieldName": "Approved", "FieldValue": "true"},
            {"FieldName": "Notes", "FieldValue": "null"},
        ]})
    );
}

#[tokio::test]
async fn load_fields_filters_system_and_read_only_schemas() {
    let client = MockRestClient::new();
    let mut read_only = schema_entry("Owner", "Text");
    read_only["ReadOnlyField"] = json!(true);
    client.add_response(
        "/contenttypes('0x0101')/fields",
        json!({"value": [
            schema_entry("Status", "Text"),
            schema_entry("Title", "Text"),
            schema_entry("Modified", "DateTime"),
            schema_entry("_HiddenNote", "Text"),
            read_only,
        ]}),
    );
    client.add_response(
        "RenderListDataAsStream",
        json!({"Row": [{"Status": "Draft"}]}),
    );

    let service = service(&client, &MockTaxonomyLookup::new());
    let fields = service.load_fields(&document()).await.unwrap();

    // Title and Modified are excluded by configuration, _HiddenNote by the
    // underscore rule, Owner by the read-only flag.
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].internal_name, "Status");
    assert_eq!(
        fields[0].kind,
        FieldKind::String {
            value: Some("Draft".to_string()),
            max_length: None
        }
    );
}

#[tokio::test]
async fn load_fields_requests_only_the_surviving_fields() {
    let client = MockRestClient::new();
    client.add_response(
        "/contenttypes('0x0101')/fields",
        json!({"value": [schema_entry("Status", "Text"), schema_entry("Pages", "Number")]}),
    );
    client.add_response("RenderListDataAsStream", json!({"Row": []}));

    let service = service(&client, &MockTaxonomyLookup::new());
    service.load_fields(&document()).await.unwrap();

    let calls = client.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].url.contains("$filter=Hidden eq false"));
    assert!(calls[0].url.contains("TermSetId"));

    let view_xml = calls[1].body["parameters"]["ViewXml"].as_str().unwrap();
    assert!(view_xml.contains("<FieldRef Name=\"Status\" />"));
    assert!(view_xml.contains("<FieldRef Name=\"Pages\" />"));
    assert!(view_xml.contains("<Value Type=\"Counter\">42</Value>"));
    assert_eq!(calls[1].body["parameters"]["RenderOptions"], json!(2));
}

#[tokio::test]
async fn load_fields_resolves_taxonomy_values_and_terms() {
    let client = MockRestClient::new();
    let mut tax_schema = schema_entry("Department", "TaxonomyFieldType");
    tax_schema["TermSetId"] = json!("ts-1");
    tax_schema["SspId"] = json!("store-1");
    client.add_response("/contenttypes('0x0101')/fields", json!({"value": [tax_schema]}));
    client.add_response(
        "RenderListDataAsStream",
        json!({"Row": [{
            "Department": [{"Label": "Engineering", "TermID": "term-guid-123"}]
        }]}),
    );

    let taxonomy =
        MockTaxonomyLookup::new().with_terms("ts-1", vec![term("term-guid-123", "Engineering")]);
    let service = service(&client, &taxonomy);
    let fields = service.load_fields(&document()).await.unwrap();

    assert_eq!(fields.len(), 1);
    match &fields[0].kind {
        FieldKind::Taxonomy {
            value: Some(value),
            terms,
            ..
        } => {
            assert_eq!(value.label, "Engineering");
            assert_eq!(value.term_guid, "term-guid-123");
            assert_eq!(terms.len(), 1);
        }
        other => panic!("expected taxonomy field, got {other:?}"),
    }
    assert_eq!(taxonomy.requested(), vec!["ts-1".to_string()]);
}

#[tokio::test]
async fn load_fields_with_no_matching_row_yields_empty_values() {
    let client = MockRestClient::new();
    client.add_response(
        "/contenttypes('0x0101')/fields",
        json!({"value": [schema_entry("Status", "Text")]}),
    );
    client.add_response("RenderListDataAsStream", json!({"Row": []}));

    let service = service(&client, &MockTaxonomyLookup::new());
    let fields = service.load_fields(&document()).await.unwrap();
    assert_eq!(fields.len(), 1);
    assert!(matches!(&fields[0].kind, FieldKind::String { value: None, .. }));
}

#[tokio::test]
async fn load_fields_skips_the_value_query_when_nothing_survives() {
    let client = MockRestClient::new();
    client.add_response(
        "/contenttypes('0x0101')/fields",
        json!({"value": [schema_entry("Title", "Text")]}),
    );

    let service = service(&client, &MockTaxonomyLookup::new());
    let fields = service.load_fields(&document()).await.unwrap();
    assert!(fields.is_empty());
    // Only the schema fetch went out.
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test]
async fn excluded_fields_are_configurable() {
    let client = MockRestClient::new();
    client.add_response(
        "/contenttypes('0x0101')/fields",
        json!({"value": [schema_entry("Status", "Text"), schema_entry("Project", "Text")]}),
    );
    client.add_response("RenderListDataAsStream", json!({"Row": []}));

    let config = MetadataServiceConfig {
        excluded_fields: vec!["Project".to_string()],
    };
    let service = MetadataService::with_config(
        Arc::new(client.clone()),
        Arc::new(MockTaxonomyLookup::new()),
        config,
    );

    let fields = service.load_fields(&document()).await.unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].internal_name, "Status");
}

#[tokio::test]
async fn backend_failures_propagate_to_the_caller() {
    // No canned responses: the schema fetch rejects.
    let client = MockRestClient::new();
    let service = service(&client, &MockTaxonomyLookup::new());
    let error = service.load_fields(&document()).await.unwrap_err();
    assert!(error.to_string().contains("404"), "unexpected error: {error}");
}
