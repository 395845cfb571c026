use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to build HTTP client")]
    InvalidClient(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// A single remote operation that did not produce a usable value.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Failed to parse JSON response from {url}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Response from {url} has no '{field}' field")]
    MissingField { url: String, field: &'static str },

    #[error("Field '{field}' in response from {url} has unusable value '{value}'")]
    InvalidValue {
        url: String,
        field: &'static str,
        value: String,
    },
}
