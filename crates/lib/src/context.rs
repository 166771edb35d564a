//! # Document Context
//!
//! A read-only snapshot of the identifiers needed to talk about one selected
//! document: item/site/web/list ids, file metadata, and the Graph drive ids
//! parsed out of the stored item URL. Built once per dialog invocation from
//! the raw list-row values; never mutated afterwards.

use std::collections::HashMap;

/// Row fields the host must project when reading the selected row.
pub const ROW_FIELDS: [&str; 8] = [
    "FileLeafRef",
    "File_x0020_Type",
    "FileRef",
    "ID",
    "UniqueId",
    "File_x0020_Size",
    "ContentTypeId",
    ".spItemUrl",
];

/// Raw input for building a [`DocumentContext`]: the selected row's values
/// keyed by internal name, plus the page-level identifiers the host exposes.
#[derive(Debug, Clone, Default)]
pub struct RowInput {
    pub row_values: HashMap<String, String>,
    pub site_url: String,
    pub web_url: String,
    pub site_id: String,
    pub web_id: String,
    pub list_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentContext {
    pub file_name: String,
    /// File extension without the leading dot, e.g. "pdf".
    pub file_type: String,
    pub server_relative_url: String,
    pub item_id: i64,
    pub unique_id: String,
    pub file_size: u64,
    pub site_url: String,
    pub web_url: String,
    pub site_id: String,
    pub web_id: String,
    pub list_id: String,
    pub content_type_id: String,
    pub sp_item_url: String,
    /// Graph drive id parsed from `sp_item_url`; empty when absent.
    pub drive_id: String,
    /// Graph drive-item id parsed from `sp_item_url`; empty when absent.
    pub drive_item_id: String,
}

impl DocumentContext {
    pub fn from_row(input: &RowInput) -> Self {
        let val = |key: &str| input.row_values.get(key).cloned().unwrap_or_default();
        let sp_item_url = val(".spItemUrl");

        Self {
            file_name: val("FileLeafRef"),
            file_type: val("File_x0020_Type"),
            server_relative_url: val("FileRef"),
            item_id: val("ID").parse().unwrap_or(0),
            unique_id: val("UniqueId"),
            file_size: val("File_x0020_Size").parse().unwrap_or(0),
            site_url: input.site_url.clone(),
            web_url: input.web_url.clone(),
            site_id: input.site_id.clone(),
            web_id: input.web_id.clone(),
            list_id: input.list_id.clone(),
            content_type_id: val("ContentTypeId"),
            drive_id: url_segment_value("drives", &sp_item_url),
            drive_item_id: url_segment_value("items", &sp_item_url),
            sp_item_url,
        }
    }

    pub fn file_size_in_kilo_bytes(&self) -> f64 {
        self.file_size as f64 / 1024.0
    }

    pub fn file_size_in_mega_bytes(&self) -> f64 {
        self.file_size as f64 / 1024.0 / 1024.0
    }
}

/// Extracts the path value following `/{segment}/` in a URL, ignoring the
/// query string. Segment matching is case-insensitive; the returned value
/// keeps its original casing. Empty when the segment is absent.
fn url_segment_value(segment: &str, url: &str) -> String {
    let without_query = url.split('?').next().unwrap_or("");
    let pattern = format!("/{segment}/");
    let Some(idx) = find_ignore_ascii_case(without_query, &pattern) else {
        return String::new();
    };
    let rest = &without_query[idx + pattern.len()..];
    match rest.find('/') {
        Some(end) => rest[..end].to_string(),
        None => rest.to_string(),
    }
}

/// Byte-window search with ASCII case folding. The needle is ASCII, so a
/// match always sits on char boundaries of the haystack; indices stay valid
/// even when the surrounding URL carries multibyte characters.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

/// Command-visibility policy: the extraction panel is offered only for a
/// single selected document whose extension is in the allowed list.
#[derive(Debug, Clone)]
pub struct SelectionPolicy {
    /// Allowed extensions including the leading dot, e.g. ".pdf".
    allowed_extensions: Vec<String>,
}

impl SelectionPolicy {
    pub fn new(allowed_extensions: Vec<String>) -> Self {
        Self { allowed_extensions }
    }

    pub fn is_allowed_file(&self, document: &DocumentContext) -> bool {
        let extension = format!(".{}", document.file_type.to_lowercase());
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.to_lowercase() == extension)
    }

    /// True only for exactly one selected row with an allowed extension.
    pub fn is_visible(&self, selection: &[DocumentContext]) -> bool {
        selection.len() == 1 && self.is_allowed_file(&selection[0])
    }

    pub fn can_execute(&self, selection: &[DocumentContext]) -> bool {
        selection
            .first()
            .is_some_and(|document| self.is_allowed_file(document))
    }
}
