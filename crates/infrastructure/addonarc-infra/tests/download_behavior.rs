use addonarc_infra::net::{DownloadError, DownloadEvent, DownloadRequest, Downloader};
use axum::http::StatusCode;
use axum::{body::Body, routing::get, Router};
use camino::Utf8PathBuf;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

async fn start_server(hits: Arc<AtomicUsize>) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let app = Router::new()
        .route("/icon.png", get(|| async { Body::from(b"PNGDATA".to_vec()) }))
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
        .route(
            "/flaky",
            get(move || {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    StatusCode::SERVICE_UNAVAILABLE
                }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, handle)
}

fn temp_root() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    (dir, root)
}

fn downloader() -> Downloader {
    Downloader::new(reqwest::Client::new()).with_retry(2, Duration::from_millis(10))
}

#[tokio::test]
async fn streams_body_to_target_and_reports_events() {
    let (addr, handle) = start_server(Arc::default()).await;
    let (_dir, root) = temp_root();
    let target = root.join("icon.png");
    let (tx, mut rx) = tokio::sync::mpsc::channel(8);

    let req = DownloadRequest {
        url: format!("http://{addr}/icon.png"),
        target_path: target.clone(),
    };
    let result = downloader().download(&req, Some(&tx)).await.unwrap();

    assert_eq!(result.bytes_downloaded, 7);
    assert_eq!(std::fs::read(&target).unwrap(), b"PNGDATA");
    assert!(!root.join("icon.png.part").exists());

    assert_eq!(rx.recv().await.unwrap(), DownloadEvent::Started { url: req.url.clone() });
    assert_eq!(
        rx.recv().await.unwrap(),
        DownloadEvent::Completed {
            url: req.url.clone(),
            success: true,
            bytes: 7
        }
    );

    handle.abort();
}

#[tokio::test]
async fn not_found_fails_without_retry_or_leftovers() {
    let (addr, handle) = start_server(Arc::default()).await;
    let (_dir, root) = temp_root();
    let target = root.join("Foo-v1.0.jar");

    let req = DownloadRequest {
        url: format!("http://{addr}/missing"),
        target_path: target.clone(),
    };
    let err = downloader().download(&req, None).await.unwrap_err();

    assert!(matches!(err, DownloadError::Status { status, .. } if status.as_u16() == 404));
    assert_eq!(err.url(), req.url);
    assert!(!target.exists());
    assert!(!root.join("Foo-v1.0.jar.part").exists());

    handle.abort();
}

#[tokio::test]
async fn server_errors_are_retried_up_to_the_limit() {
    let hits = Arc::new(AtomicUsize::new(0));
    let (addr, handle) = start_server(hits.clone()).await;
    let (_dir, root) = temp_root();

    let req = DownloadRequest {
        url: format!("http://{addr}/flaky"),
        target_path: root.join("flaky.jar"),
    };
    let err = downloader().download(&req, None).await.unwrap_err();

    assert!(matches!(err, DownloadError::Status { .. }));
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    handle.abort();
}

#[tokio::test]
async fn missing_directory_is_a_write_error() {
    let (addr, handle) = start_server(Arc::default()).await;
    let (_dir, root) = temp_root();

    let req = DownloadRequest {
        url: format!("http://{addr}/icon.png"),
        target_path: root.join("not-created").join("icon.png"),
    };
    let err = downloader().download(&req, None).await.unwrap_err();

    assert!(matches!(err, DownloadError::Write { .. }));

    handle.abort();
}

#[tokio::test]
async fn unreachable_host_is_a_request_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let (_dir, root) = temp_root();

    let req = DownloadRequest {
        url: format!("http://{addr}/icon.png"),
        target_path: root.join("icon.png"),
    };
    let err = downloader().download(&req, None).await.unwrap_err();

    assert!(matches!(err, DownloadError::Request { .. }));
}
