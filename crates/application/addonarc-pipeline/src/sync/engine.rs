use std::sync::Arc;

use addonarc_core::{reconcile_bucket, Archive, BucketOutcome, Mutation, RemoteCatalog};
use addonarc_infra::net::{DownloadEvent, Downloader};
use addonarc_persistence::{ArchiveStore, DataLayout, JsonArchiveStore};
use tokio::sync::mpsc::Sender;
use tracing::{info, warn};

use crate::sync::execute::{execute_outcome, ArtifactDownloader};
use crate::sync::remote::{CatalogFetcher, HttpCatalogFetcher};
use crate::sync::{BucketReport, CatalogEndpoints, SyncError, UpdateReport};

pub struct ArchiveSyncEngine {
    fetcher: Box<dyn CatalogFetcher>,
    downloader: Box<dyn ArtifactDownloader>,
    store: Arc<dyn ArchiveStore>,
    layout: DataLayout,
    endpoints: CatalogEndpoints,
}

impl ArchiveSyncEngine {
    pub fn new(client: reqwest::Client, layout: DataLayout, endpoints: CatalogEndpoints) -> Self {
        let fetcher = Box::new(HttpCatalogFetcher::new(client.clone(), &endpoints));
        let downloader = Box::new(Downloader::new(client));
        let store: Arc<dyn ArchiveStore> = Arc::new(JsonArchiveStore::for_layout(&layout));
        Self {
            fetcher,
            downloader,
            store,
            layout,
            endpoints,
        }
    }

    pub fn with_components(
        fetcher: Box<dyn CatalogFetcher>,
        downloader: Box<dyn ArtifactDownloader>,
        store: Arc<dyn ArchiveStore>,
        layout: DataLayout,
        endpoints: CatalogEndpoints,
    ) -> Self {
        Self {
            fetcher,
            downloader,
            store,
            layout,
            endpoints,
        }
    }

    /// Reads the persisted archive (empty on first run).
    pub fn load_archive(&self) -> Result<Archive, SyncError> {
        Ok(self.store.load()?)
    }

    pub async fn fetch_catalog(&self) -> Result<RemoteCatalog, SyncError> {
        info!("Downloading addon list...");
        self.fetcher.fetch().await
    }

    /// Dry run: reconciles a copy of the archive against the live catalog
    /// without downloading or persisting anything.
    pub async fn plan(&self) -> Result<UpdateReport, SyncError> {
        let mut archive = self.load_archive()?;
        let catalog = self.fetch_catalog().await?;

        let mut report = UpdateReport::default();
        for (key, remote) in &catalog.addons {
            let outcome =
                reconcile_bucket(key, archive.bucket_mut(key), remote, &catalog.categories);
            report.stats.absorb(&outcome);
            report.buckets.push(BucketReport {
                outcome,
                failures: Vec::new(),
            });
        }
        Ok(report)
    }

    /// Full update pass: load, fetch, reconcile every published bucket with
    /// its downloads, then persist once.
    ///
    /// Run-scoped failures return before the archive is written, leaving the
    /// previous state on disk.
    pub async fn update(
        &self,
        progress_tx: Option<Sender<DownloadEvent>>,
    ) -> Result<UpdateReport, SyncError> {
        let mut archive = self.load_archive()?;
        let catalog = self.fetch_catalog().await?;

        let mut report = UpdateReport {
            executed: true,
            ..Default::default()
        };

        for (key, remote) in &catalog.addons {
            let outcome =
                reconcile_bucket(key, archive.bucket_mut(key), remote, &catalog.categories);
            log_outcome(&outcome);

            let executed = execute_outcome(
                self.downloader.as_ref(),
                &self.layout,
                &self.endpoints,
                &outcome,
                progress_tx.as_ref(),
            )
            .await;

            report.stats.absorb(&outcome);
            report.stats.downloads_failed += executed.failures.len();
            report.stats.bytes_downloaded += executed.bytes_downloaded;
            report.buckets.push(BucketReport {
                outcome,
                failures: executed.failures,
            });
        }

        self.store.save(&archive)?;
        info!(
            "Archive saved: {} change(s), {} failed download(s)",
            report.stats.mutations(),
            report.stats.downloads_failed
        );
        Ok(report)
    }
}

/// Logs a bucket pass in two phases: catalog entries first, then the
/// deletion sweep. Sweep mutations always trail the others.
fn log_outcome(outcome: &BucketOutcome) {
    let bucket = outcome.bucket.as_str();
    let (deleted, changed): (Vec<&Mutation>, Vec<&Mutation>) = outcome
        .mutations
        .iter()
        .partition(|m| matches!(m, Mutation::Deleted { .. }));

    info!("Checking for new/updated addons (MC {bucket})...");
    for skipped in &outcome.skipped {
        warn!(
            "Skipping descriptor #{} ({}) in MC {bucket}: {}",
            skipped.position,
            skipped.uuid.as_deref().unwrap_or("unknown uuid"),
            skipped.error
        );
    }

    for mutation in changed {
        match mutation {
            Mutation::Created {
                uuid, name, author, ..
            } => info!("Found new addon {name} by {author} [mc{bucket}/{uuid}]"),
            Mutation::Updated {
                uuid,
                name,
                author,
                previous_version,
                version,
            } => info!(
                "Found update for addon {name} by {author} [mc{bucket}/{uuid}] v{previous_version} -> v{version}"
            ),
            Mutation::Undeleted { uuid, name } => {
                info!("Addon {name} is listed again [mc{bucket}/{uuid}]")
            }
            Mutation::Deleted { .. } => {}
        }
    }

    info!("Checking for deleted addons (MC {bucket})...");
    for mutation in deleted {
        if let Mutation::Deleted { uuid, name, author } = mutation {
            info!("Found deleted addon {name} by {author} [mc{bucket}/{uuid}]");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    use tracing::Dispatch;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    struct LogBufferGuard(Arc<Mutex<Vec<u8>>>);

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogBufferGuard;

        fn make_writer(&'a self) -> Self::Writer {
            LogBufferGuard(self.0.clone())
        }
    }

    impl Write for LogBufferGuard {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn captured(outcome: &BucketOutcome) -> Vec<String> {
        let buffer = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(buffer.clone())
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::dispatcher::with_default(&Dispatch::new(subscriber), || log_outcome(outcome));

        let raw = buffer.0.lock().unwrap().clone();
        String::from_utf8(raw)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn position(lines: &[String], needle: &str) -> usize {
        lines
            .iter()
            .position(|l| l.contains(needle))
            .unwrap_or_else(|| panic!("no log line containing {needle:?} in {lines:#?}"))
    }

    #[test]
    fn sweep_banner_precedes_deletions() {
        let outcome = BucketOutcome {
            bucket: "1.8".into(),
            mutations: vec![
                Mutation::Created {
                    uuid: "b2".into(),
                    name: "Bar".into(),
                    author: "Y".into(),
                    version: "2.0".into(),
                },
                Mutation::Deleted {
                    uuid: "a1".into(),
                    name: "Foo".into(),
                    author: "X".into(),
                },
            ],
            skipped: Vec::new(),
        };

        let lines = captured(&outcome);

        let scan = position(&lines, "Checking for new/updated addons (MC 1.8)...");
        let created = position(&lines, "Found new addon Bar by Y [mc1.8/b2]");
        let sweep = position(&lines, "Checking for deleted addons (MC 1.8)...");
        let deleted = position(&lines, "Found deleted addon Foo by X [mc1.8/a1]");
        assert!(scan < created && created < sweep && sweep < deleted);
    }

    #[test]
    fn sweep_banner_is_logged_for_quiet_buckets() {
        let lines = captured(&BucketOutcome {
            bucket: "1.12".into(),
            ..Default::default()
        });
        position(&lines, "Checking for deleted addons (MC 1.12)...");
        assert_eq!(lines.len(), 2);
    }
}
