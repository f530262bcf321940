use crate::sync::{CatalogEndpoints, SyncError};
use addonarc_core::RemoteCatalog;
use reqwest::Client;
use tracing::debug;

#[async_trait::async_trait]
pub trait CatalogFetcher: Send + Sync {
    async fn fetch(&self) -> Result<RemoteCatalog, SyncError>;
}

/// Fetches `addons.json` over plain GET. No retries: a failed fetch aborts
/// the run before anything is reconciled.
pub struct HttpCatalogFetcher {
    client: Client,
    catalog_url: String,
}

impl HttpCatalogFetcher {
    pub fn new(client: Client, endpoints: &CatalogEndpoints) -> Self {
        Self {
            client,
            catalog_url: endpoints.catalog_url.clone(),
        }
    }
}

#[async_trait::async_trait]
impl CatalogFetcher for HttpCatalogFetcher {
    async fn fetch(&self) -> Result<RemoteCatalog, SyncError> {
        let url = &self.catalog_url;

        let bytes = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| SyncError::Network(format!("catalog request to {url} failed: {e}")))?
            .bytes()
            .await
            .map_err(|e| SyncError::Network(format!("catalog body from {url} failed: {e}")))?;

        debug!("catalog fetched ({} bytes)", bytes.len());

        serde_json::from_slice(&bytes)
            .map_err(|e| SyncError::Format(format!("catalog from {url} does not parse: {e}")))
    }
}
