//! Asset downloads against an in-process HTTP server.

use axum::http::{header, StatusCode};
use axum::{routing::get, Router};
use signup_flow_lib::assets::{AssetFetcher, FALLBACK_JPEG, JPEG_MIME};
use signup_flow_lib::identity::AssetKind;
use std::net::SocketAddr;
use tokio::sync::oneshot;

const IMAGE: &[u8] = &[0xFF, 0xD8, 0xFF, 0xDB, 0x01, 0x02, 0x03, 0xFF, 0xD9];

async fn spawn_image_server() -> (String, oneshot::Sender<()>) {
    let app = Router::new()
        .route(
            "/image.jpg",
            get(|| async { ([(header::CONTENT_TYPE, "image/jpeg")], IMAGE) }),
        )
        .route("/empty.jpg", get(|| async { "" }))
        .route(
            "/missing.jpg",
            get(|| async { (StatusCode::NOT_FOUND, "not found") }),
        )
        .route(
            "/broken.jpg",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let base = format!("http://127.0.0.1:{}", addr.port());

    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = rx.await;
            })
            .await
            .ok();
    });

    (base, tx)
}

#[tokio::test]
async fn test_fetch_returns_downloaded_bytes() {
    let (base, shutdown) = spawn_image_server().await;
    let fetcher = AssetFetcher::new();

    let bytes = fetcher.fetch(&format!("{}/image.jpg", base)).await;
    assert_eq!(bytes, IMAGE);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_non_success_status_uses_fallback() {
    let (base, shutdown) = spawn_image_server().await;
    let fetcher = AssetFetcher::new();

    for path in ["/missing.jpg", "/broken.jpg", "/no-such-route"] {
        let bytes = fetcher.fetch(&format!("{}{}", base, path)).await;
        assert_eq!(bytes, FALLBACK_JPEG.to_vec(), "path {}", path);
    }

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_empty_body_uses_fallback() {
    let (base, shutdown) = spawn_image_server().await;
    let fetcher = AssetFetcher::new();

    let bytes = fetcher.fetch(&format!("{}/empty.jpg", base)).await;
    assert_eq!(bytes, FALLBACK_JPEG.to_vec());

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_unreachable_url_uses_fallback() {
    // Bind then drop to get a port with nothing listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let bytes = AssetFetcher::new()
        .fetch(&format!("http://127.0.0.1:{}/image.jpg", port))
        .await;

    assert!(!bytes.is_empty());
    assert_eq!(bytes, FALLBACK_JPEG.to_vec());
}

#[tokio::test]
async fn test_malformed_url_uses_fallback() {
    let bytes = AssetFetcher::new().fetch("not a url").await;
    assert_eq!(bytes, FALLBACK_JPEG.to_vec());
}

#[tokio::test]
async fn test_attachment_is_named_jpeg() {
    let (base, shutdown) = spawn_image_server().await;
    let fetcher = AssetFetcher::new();

    let file = fetcher
        .attachment(AssetKind::Registration, &format!("{}/image.jpg", base))
        .await;

    assert_eq!(file.mime_type, JPEG_MIME);
    assert_eq!(file.bytes, IMAGE);
    assert!(file.name.ends_with(".jpg"));
    assert!(AssetKind::Registration
        .name_pool()
        .iter()
        .any(|n| file.name.starts_with(n)));

    let _ = shutdown.send(());
}

#[test]
fn test_fallback_is_minimal_jpeg() {
    assert_eq!(&FALLBACK_JPEG[..2], &[0xFF, 0xD8]);
    assert_eq!(&FALLBACK_JPEG[FALLBACK_JPEG.len() - 2..], &[0xFF, 0xD9]);
    assert_eq!(&FALLBACK_JPEG[6..10], b"JFIF");
}
