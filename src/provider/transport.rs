use crate::provider::error::TransportError;
use log::{debug, warn};
use reqwest::blocking::Client;
use std::time::Duration;

/// Blocking text fetch used for every call to the provider.
pub trait Transport: Send + Sync {
    /// Performs a GET on `url` and returns the response body.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NetworkRequest`] if the request cannot be sent or
    /// the body cannot be read, and [`TransportError::HttpStatus`] for any
    /// non-success status.
    fn fetch_text(&self, url: &str) -> Result<String, TransportError>;
}

/// [`Transport`] backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds the underlying client with a whole-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidClient`] if the TLS backend or resolver
    /// cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::InvalidClient)?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn fetch_text(&self, url: &str) -> Result<String, TransportError> {
        debug!("Requesting {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| TransportError::NetworkRequest(url.to_string(), e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("HTTP error for {}: {}", url, status);
            return Err(TransportError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        response
            .text()
            .map_err(|e| TransportError::NetworkRequest(url.to_string(), e))
    }
}
