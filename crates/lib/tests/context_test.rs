//! Tests for document-context derivation and the selection policy.

use std::collections::HashMap;

use docmeta::context::{DocumentContext, RowInput, SelectionPolicy, ROW_FIELDS};

fn row_input() -> RowInput {
    let mut row_values = HashMap::new();
    row_values.insert("FileLeafRef".to_string(), "contract.pdf".to_string());
    row_values.insert("File_x0020_Type".to_string(), "pdf".to_string());
    row_values.insert(
        "FileRef".to_string(),
        "/sites/TestSite/Docs/contract.pdf".to_string(),
    );
    row_values.insert("ID".to_string(), "42".to_string());
    row_values.insert("UniqueId".to_string(), "{AAAA-BBBB}".to_string());
    row_values.insert("File_x0020_Size".to_string(), "2097152".to_string());
    row_values.insert("ContentTypeId".to_string(), "0x0101009A".to_string());
    row_values.insert(
        ".spItemUrl".to_string(),
        "https://contoso.sharepoint.com/_api/v2.0/drives/b!ZHJ2/items/01ABCDEF?version=Published&select=*"
            .to_string(),
    );
    RowInput {
        row_values,
        site_url: "https://contoso.sharepoint.com".to_string(),
        web_url: "https://contoso.sharepoint.com/sites/TestSite".to_string(),
        site_id: "site-guid".to_string(),
        web_id: "web-guid".to_string(),
        list_id: "list-guid".to_string(),
    }
}

#[test]
fn context_snapshots_row_and_page_identifiers() {
    let ctx = DocumentContext::from_row(&row_input());
    assert_eq!(ctx.file_name, "contract.pdf");
    assert_eq!(ctx.file_type, "pdf");
    assert_eq!(ctx.item_id, 42);
    assert_eq!(ctx.file_size, 2_097_152);
    assert_eq!(ctx.content_type_id, "0x0101009A");
    assert_eq!(ctx.list_id, "list-guid");
    assert_eq!(ctx.web_url, "https://contoso.sharepoint.com/sites/TestSite");
}

#[test]
fn file_size_conversions() {
    let ctx = DocumentContext::from_row(&row_input());
    assert_eq!(ctx.file_size_in_kilo_bytes(), 2048.0);
    assert_eq!(ctx.file_size_in_mega_bytes(), 2.0);
}

#[test]
fn drive_ids_are_parsed_from_the_item_url() {
    let ctx = DocumentContext::from_row(&row_input());
    assert_eq!(ctx.drive_id, "b!ZHJ2");
    assert_eq!(ctx.drive_item_id, "01ABCDEF");
}

#[test]
fn drive_segment_matching_is_case_insensitive_and_query_safe() {
    let mut input = row_input();
    input.row_values.insert(
        ".spItemUrl".to_string(),
        "https://contoso.sharepoint.com/_api/v2.0/Drives/XYZ/Items/ITEM9".to_string(),
    );
    let ctx = DocumentContext::from_row(&input);
    assert_eq!(ctx.drive_id, "XYZ");
    assert_eq!(ctx.drive_item_id, "ITEM9");
}

#[test]
fn drive_parsing_survives_multibyte_characters_in_the_url() {
    // Stored item URLs are caller-controlled; multibyte characters ahead of
    // the segment must not break byte-index slicing.
    let mut input = row_input();
    input
        .row_values
        .insert(".spItemUrl".to_string(), "İİİİİ/drives/ab".to_string());
    let ctx = DocumentContext::from_row(&input);
    assert_eq!(ctx.drive_id, "ab");
    assert_eq!(ctx.drive_item_id, "");

    input.row_values.insert(
        ".spItemUrl".to_string(),
        "https://contoso.sharepoint.com/sites/üñî/_api/v2.0/drives/b!drv/items/01ITEM".to_string(),
    );
    let ctx = DocumentContext::from_row(&input);
    assert_eq!(ctx.drive_id, "b!drv");
    assert_eq!(ctx.drive_item_id, "01ITEM");
}

#[test]
fn missing_segments_and_values_default_to_empty() {
    let ctx = DocumentContext::from_row(&RowInput::default());
    assert_eq!(ctx.item_id, 0);
    assert_eq!(ctx.file_size, 0);
    assert_eq!(ctx.drive_id, "");
    assert_eq!(ctx.drive_item_id, "");
}

#[test]
fn row_fields_include_the_item_url_projection() {
    assert!(ROW_FIELDS.contains(&".spItemUrl"));
    assert!(ROW_FIELDS.contains(&"ContentTypeId"));
}

#[test]
fn panel_is_visible_only_for_a_single_allowed_document() {
    let policy = SelectionPolicy::new(vec![".pdf".to_string(), ".docx".to_string()]);
    let pdf = DocumentContext::from_row(&row_input());

    assert!(policy.is_visible(std::slice::from_ref(&pdf)));
    assert!(!policy.is_visible(&[]));
    assert!(!policy.is_visible(&[pdf.clone(), pdf.clone()]));

    let mut txt_input = row_input();
    txt_input
        .row_values
        .insert("File_x0020_Type".to_string(), "txt".to_string());
    let txt = DocumentContext::from_row(&txt_input);
    assert!(!policy.is_visible(std::slice::from_ref(&txt)));
}

#[test]
fn extension_matching_is_case_insensitive() {
    let policy = SelectionPolicy::new(vec![".PDF".to_string()]);
    let pdf = DocumentContext::from_row(&row_input());
    assert!(policy.is_allowed_file(&pdf));
    assert!(policy.can_execute(std::slice::from_ref(&pdf)));
    assert!(!policy.can_execute(&[]));
}
