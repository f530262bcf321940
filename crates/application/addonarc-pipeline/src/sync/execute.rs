use addonarc_core::{Artifact, BucketOutcome};
use addonarc_infra::net::{
    DownloadError, DownloadEvent, DownloadRequest, DownloadResult, Downloader,
};
use addonarc_persistence::DataLayout;
use tokio::sync::mpsc::Sender;
use tracing::warn;

use crate::sync::{CatalogEndpoints, DownloadFailure};

#[async_trait::async_trait]
pub trait ArtifactDownloader: Send + Sync {
    async fn download(
        &self,
        req: &DownloadRequest,
        progress_tx: Option<&Sender<DownloadEvent>>,
    ) -> Result<DownloadResult, DownloadError>;
}

#[async_trait::async_trait]
impl ArtifactDownloader for Downloader {
    async fn download(
        &self,
        req: &DownloadRequest,
        progress_tx: Option<&Sender<DownloadEvent>>,
    ) -> Result<DownloadResult, DownloadError> {
        Downloader::download(self, req, progress_tx).await
    }
}

pub(crate) fn request_for(
    layout: &DataLayout,
    endpoints: &CatalogEndpoints,
    bucket: &str,
    artifact: &Artifact,
) -> DownloadRequest {
    match artifact {
        Artifact::Icon { uuid } => DownloadRequest {
            url: endpoints.icon_url(uuid),
            target_path: layout.icon_path(bucket, uuid),
        },
        Artifact::Jar {
            uuid,
            name,
            version,
        } => DownloadRequest {
            url: endpoints.download_url(uuid),
            target_path: layout.jar_path(bucket, uuid, name, version),
        },
    }
}

#[derive(Debug, Default)]
pub(crate) struct ExecutionSummary {
    pub failures: Vec<DownloadFailure>,
    pub bytes_downloaded: u64,
}

/// Runs every download a reconciled bucket asks for, one after another.
/// Failures are collected, never propagated.
pub(crate) async fn execute_outcome(
    downloader: &dyn ArtifactDownloader,
    layout: &DataLayout,
    endpoints: &CatalogEndpoints,
    outcome: &BucketOutcome,
    progress_tx: Option<&Sender<DownloadEvent>>,
) -> ExecutionSummary {
    let bucket = outcome.bucket.as_str();
    let mut summary = ExecutionSummary::default();

    for mutation in &outcome.mutations {
        let artifacts = mutation.artifacts();
        if artifacts.is_empty() {
            continue;
        }

        let uuid = mutation.uuid();
        let dir = layout.addon_dir(bucket, uuid);
        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            warn!("Can not create {dir} for {} [mc{bucket}/{uuid}]: {e}", mutation.name());
            for artifact in &artifacts {
                let req = request_for(layout, endpoints, bucket, artifact);
                summary.failures.push(DownloadFailure {
                    bucket: bucket.to_string(),
                    uuid: uuid.to_string(),
                    url: req.url,
                    error: format!("cannot create {dir}: {e}"),
                });
            }
            continue;
        }

        for artifact in &artifacts {
            let req = request_for(layout, endpoints, bucket, artifact);
            match downloader.download(&req, progress_tx).await {
                Ok(result) => summary.bytes_downloaded += result.bytes_downloaded,
                Err(e) => {
                    warn!(
                        "Download for {} [mc{bucket}/{uuid}] failed: {e}",
                        mutation.name()
                    );
                    summary.failures.push(DownloadFailure {
                        bucket: bucket.to_string(),
                        uuid: uuid.to_string(),
                        url: req.url,
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    summary
}
