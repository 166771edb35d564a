//! # docmeta
//!
//! Models SharePoint list-item metadata as typed fields, and glues them to
//! an LLM extraction service: load the editable fields of a document's
//! content type, shape a batch extraction request, validate the extracted
//! values against each field's constraints, and write accepted values back
//! through the validate-update endpoint.
//!
//! The host extension lifecycle and the panel rendering live with the
//! caller; this crate provides the field model, the transcoding rules, the
//! collaborator seams (REST, term store, extraction service) and the
//! orchestration on top of them.

pub mod context;
pub mod errors;
pub mod extraction;
pub mod fields;
pub mod services;

pub use context::{DocumentContext, RowInput, SelectionPolicy};
pub use errors::MetadataError;
pub use extraction::{
    apply_results, build_extraction_request, Confidence, DocumentLocation, ExtractionField,
    ExtractionFieldSchema, ExtractionRequest, ExtractionResponse, ExtractionResult,
    ExtractionType,
};
pub use fields::{CandidateValue, Field, FieldFactory, FieldKind, FieldSchema, TaxonomyValue, Term};
pub use services::{
    FieldValueUpdate, LlmExtractionService, LlmExtractor, MetadataService, MetadataServiceConfig,
    RestClient, SharePointRestClient, TaxonomyLookup, TaxonomyService,
};
