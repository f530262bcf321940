use camino::{Utf8Path, Utf8PathBuf};
use futures::stream::StreamExt;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc::Sender;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub target_path: Utf8PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadResult {
    pub bytes_downloaded: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadEvent {
    Started { url: String },
    Completed { url: String, success: bool, bytes: u64 },
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: StatusCode },
    #[error("response body from {url} broke off: {source}")]
    Stream { url: String, source: reqwest::Error },
    #[error("cannot write {path} for {url}: {source}")]
    Write {
        url: String,
        path: Utf8PathBuf,
        source: std::io::Error,
    },
}

impl DownloadError {
    pub fn url(&self) -> &str {
        match self {
            DownloadError::Request { url, .. }
            | DownloadError::Status { url, .. }
            | DownloadError::Stream { url, .. }
            | DownloadError::Write { url, .. } => url,
        }
    }

    /// Client errors (404, 403, ...) will not go away by asking again.
    fn is_permanent(&self) -> bool {
        match self {
            DownloadError::Status { status, .. } => status.is_client_error(),
            DownloadError::Write { .. } => true,
            _ => false,
        }
    }
}

/// Builds the shared HTTP client used for the catalog and every artifact.
pub fn default_http_client() -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(addonarc_config::USER_AGENT)
        .connect_timeout(Duration::from_secs(
            addonarc_config::HTTP_CONNECT_TIMEOUT_SECS,
        ))
        .timeout(Duration::from_secs(addonarc_config::HTTP_REQUEST_TIMEOUT_SECS))
        .build()
}

/// Streams single artifacts to disk. Does NOT create directories or know
/// anything about add-ons.
#[derive(Clone)]
pub struct Downloader {
    client: Client,
    attempts: u32,
    retry_delay: Duration,
}

impl Downloader {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            attempts: addonarc_config::DOWNLOAD_ATTEMPTS,
            retry_delay: Duration::from_millis(addonarc_config::DOWNLOAD_RETRY_DELAY_MS),
        }
    }

    pub fn with_retry(mut self, attempts: u32, retry_delay: Duration) -> Self {
        self.attempts = addonarc_config::clamp_attempts(attempts);
        self.retry_delay = retry_delay;
        self
    }

    /// Downloads `req.url` into `req.target_path`.
    ///
    /// The body is written to a `.part` sibling and renamed over the target
    /// only once the stream completed, so a failed download never leaves a
    /// truncated file under the final name.
    pub async fn download(
        &self,
        req: &DownloadRequest,
        progress_tx: Option<&Sender<DownloadEvent>>,
    ) -> Result<DownloadResult, DownloadError> {
        if let Some(tx) = progress_tx {
            let _ = tx
                .send(DownloadEvent::Started {
                    url: req.url.clone(),
                })
                .await;
        }

        let tmp_path = part_path(&req.target_path);
        let mut attempt = 0u32;
        let result = loop {
            attempt += 1;
            match self.download_once(req, &tmp_path).await {
                Ok(bytes) => break Ok(bytes),
                Err(e) if e.is_permanent() || attempt >= self.attempts => break Err(e),
                Err(e) => {
                    debug!("attempt {attempt} for {} failed: {e}", req.url);
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        };

        let result = match result {
            Ok(bytes) => match tokio::fs::rename(&tmp_path, &req.target_path).await {
                Ok(()) => Ok(DownloadResult {
                    bytes_downloaded: bytes,
                }),
                Err(source) => Err(DownloadError::Write {
                    url: req.url.clone(),
                    path: req.target_path.clone(),
                    source,
                }),
            },
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            debug!("Can not download from \"{}\": {e}", req.url);
            let _ = tokio::fs::remove_file(&tmp_path).await;
        }

        if let Some(tx) = progress_tx {
            let _ = tx
                .send(DownloadEvent::Completed {
                    url: req.url.clone(),
                    success: result.is_ok(),
                    bytes: result.as_ref().map(|r| r.bytes_downloaded).unwrap_or(0),
                })
                .await;
        }

        result
    }

    async fn download_once(
        &self,
        req: &DownloadRequest,
        tmp_path: &Utf8Path,
    ) -> Result<u64, DownloadError> {
        let resp = self
            .client
            .get(&req.url)
            .send()
            .await
            .map_err(|source| DownloadError::Request {
                url: req.url.clone(),
                source,
            })?;

        if !resp.status().is_success() {
            return Err(DownloadError::Status {
                url: req.url.clone(),
                status: resp.status(),
            });
        }

        let write_err = |source: std::io::Error| DownloadError::Write {
            url: req.url.clone(),
            path: tmp_path.to_path_buf(),
            source,
        };

        let mut file = File::create(tmp_path.as_std_path())
            .await
            .map_err(write_err)?;
        let mut stream = resp.bytes_stream();
        let mut total_written = 0u64;

        while let Some(chunk_res) = stream.next().await {
            let chunk = chunk_res.map_err(|source| DownloadError::Stream {
                url: req.url.clone(),
                source,
            })?;
            file.write_all(&chunk).await.map_err(write_err)?;
            total_written += chunk.len() as u64;
        }

        file.flush().await.map_err(write_err)?;
        Ok(total_written)
    }
}

fn part_path(target: &Utf8Path) -> Utf8PathBuf {
    let mut name = target.file_name().unwrap_or("download").to_string();
    name.push_str(".part");
    target.with_file_name(name)
}
