use crate::provider::endpoint::Endpoint;
use crate::provider::error::FetchError;
use crate::provider::transport::Transport;
use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Name -> provider code, for one level of the location hierarchy.
pub type CodeTable = HashMap<String, String>;

/// Issues requests against the provider and decodes its code listings.
///
/// Cheap to clone; clones share the same transport.
#[derive(Clone)]
pub struct ProviderClient {
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ProviderClient {
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    /// Absolute URL of `endpoint` under this client's base URL.
    pub fn url(&self, endpoint: Endpoint<'_>) -> String {
        endpoint.url(&self.base_url)
    }

    /// Fetches the raw body behind `endpoint`. Returns the URL alongside the body
    /// so callers can attach it to decoding errors.
    pub fn fetch(&self, endpoint: Endpoint<'_>) -> Result<(String, String), FetchError> {
        let url = self.url(endpoint);
        let body = self.transport.fetch_text(&url)?;
        Ok((url, body))
    }

    /// Fetches a `{code: name}` listing and inverts it into a name -> code table.
    pub fn code_table(&self, endpoint: Endpoint<'_>) -> Result<CodeTable, FetchError> {
        let (url, body) = self.fetch(endpoint)?;
        let listing: BTreeMap<String, String> =
            serde_json::from_str(&body).map_err(|e| FetchError::Parse {
                url: url.clone(),
                source: e,
            })?;
        Ok(invert_listing(&url, listing))
    }
}

// Listings are walked in code order, so a duplicated name keeps its lowest code.
fn invert_listing(url: &str, listing: BTreeMap<String, String>) -> CodeTable {
    let mut table = CodeTable::with_capacity(listing.len());
    for (code, name) in listing {
        if let Some(existing) = table.get(&name) {
            debug!(
                "Duplicate name '{}' in {} (codes {} and {}), keeping {}",
                name, url, existing, code, existing
            );
            continue;
        }
        table.insert(name, code);
    }
    table
}
