use thiserror::Error;

/// Custom error types for the library.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to build Reqwest client: {0}")]
    RestClientBuild(reqwest::Error),
    #[error("Failed to send request: {0}")]
    RestRequest(reqwest::Error),
    #[error("Failed to deserialize response body: {0}")]
    RestDeserialization(reqwest::Error),
    #[error("The API returned an error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("Unexpected response shape: {0}")]
    ResponseShape(#[from] serde_json::Error),
}
