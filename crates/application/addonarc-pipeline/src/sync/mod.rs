use addonarc_core::{BucketOutcome, Mutation};
use addonarc_persistence::{DataLayout, StorageError};

pub mod engine;
pub mod execute;
pub mod remote;

pub use engine::ArchiveSyncEngine;
pub use execute::ArtifactDownloader;
pub use remote::{CatalogFetcher, HttpCatalogFetcher};

/// Where the catalog and the artifacts are fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEndpoints {
    pub catalog_url: String,
    /// Jar URL; `{uuid}` is replaced with the add-on uuid.
    pub download_url_template: String,
    /// Icon URL; `{uuid}` is replaced with the add-on uuid.
    pub icon_url_template: String,
}

impl Default for CatalogEndpoints {
    fn default() -> Self {
        Self {
            catalog_url: addonarc_config::DEFAULT_CATALOG_URL.to_string(),
            download_url_template: addonarc_config::DEFAULT_DOWNLOAD_URL_TEMPLATE.to_string(),
            icon_url_template: addonarc_config::DEFAULT_ICON_URL_TEMPLATE.to_string(),
        }
    }
}

impl CatalogEndpoints {
    pub fn download_url(&self, uuid: &str) -> String {
        self.download_url_template
            .replace(addonarc_config::UUID_PLACEHOLDER, uuid)
    }

    pub fn icon_url(&self, uuid: &str) -> String {
        self.icon_url_template
            .replace(addonarc_config::UUID_PLACEHOLDER, uuid)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateStats {
    pub buckets: usize,
    pub created: usize,
    pub updated: usize,
    pub undeleted: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub downloads_planned: usize,
    pub downloads_failed: usize,
    pub bytes_downloaded: u64,
}

impl UpdateStats {
    pub(crate) fn absorb(&mut self, outcome: &BucketOutcome) {
        self.buckets += 1;
        self.skipped += outcome.skipped.len();
        for mutation in &outcome.mutations {
            match mutation {
                Mutation::Created { .. } => self.created += 1,
                Mutation::Updated { .. } => self.updated += 1,
                Mutation::Undeleted { .. } => self.undeleted += 1,
                Mutation::Deleted { .. } => self.deleted += 1,
            }
            self.downloads_planned += mutation.artifacts().len();
        }
    }

    pub fn mutations(&self) -> usize {
        self.created + self.updated + self.undeleted + self.deleted
    }
}

/// A best-effort download that did not make it to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadFailure {
    pub bucket: String,
    pub uuid: String,
    pub url: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketReport {
    pub outcome: BucketOutcome,
    pub failures: Vec<DownloadFailure>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub buckets: Vec<BucketReport>,
    pub stats: UpdateStats,
    /// False for dry runs: nothing was downloaded or persisted.
    pub executed: bool,
}

/// Run-scoped failures. Item-scoped problems never surface here.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Catalog fetch error: {0}")]
    Network(String),
    #[error("Catalog format error: {0}")]
    Format(String),
    #[error("Archive error: {0}")]
    Archive(#[from] StorageError),
}

/// Convenience constructor for the HTTP + JSON archive engine.
pub fn default_engine(
    client: reqwest::Client,
    layout: DataLayout,
    endpoints: CatalogEndpoints,
) -> ArchiveSyncEngine {
    ArchiveSyncEngine::new(client, layout, endpoints)
}

#[cfg(test)]
mod tests {
    use super::CatalogEndpoints;

    #[test]
    fn default_endpoints_expand_uuid() {
        let endpoints = CatalogEndpoints::default();
        assert_eq!(
            endpoints.download_url("abc-123"),
            "https://dl.labymod.net/latest/?file=abc-123&a=1"
        );
        assert_eq!(
            endpoints.icon_url("abc-123"),
            "https://dl.labymod.net/latest/addons/abc-123/icon.png"
        );
    }
}
