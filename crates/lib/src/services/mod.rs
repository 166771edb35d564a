//! Collaborator interfaces and their reqwest-backed implementations, plus
//! the metadata orchestration service.

pub mod llm;
pub mod metadata;
pub mod rest;
pub mod taxonomy;

pub use llm::{LlmExtractionService, LlmExtractor};
pub use metadata::{FieldValueUpdate, MetadataService, MetadataServiceConfig};
pub use rest::{RestClient, SharePointRestClient};
pub use taxonomy::{TaxonomyLookup, TaxonomyService};
