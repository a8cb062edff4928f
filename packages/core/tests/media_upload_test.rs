//! Media upload against a local HTTP origin

mod common;

use anyhow::Result;
use axum::http::{header, StatusCode};
use axum::routing::get;
use axum::Router;
use common::TestGateway;
use content_mcp_core::services::media_service::DEFAULT_FILENAME;
use serde_json::json;
use std::net::SocketAddr;
use tokio::net::TcpListener;

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0];

/// Serve a tiny image origin on an ephemeral port
async fn spawn_origin() -> Result<SocketAddr> {
    let app = Router::new()
        .route(
            "/images/sunset.png",
            get(|| async { ([(header::CONTENT_TYPE, "image/png")], PNG_BYTES) }),
        )
        .route("/raw/", get(|| async { "plain bytes" }))
        .route("/gone.png", get(|| async { StatusCode::NOT_FOUND }));

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(addr)
}

#[tokio::test]
async fn test_upload_names_file_from_url_path() -> Result<()> {
    let addr = spawn_origin().await?;
    let gateway = TestGateway::new();

    let (body, is_error) = gateway
        .call(
            "upload_media",
            json!({ "url": format!("http://{}/images/sunset.png", addr), "alternativeText": "Sunset" }),
        )
        .await;

    assert!(!is_error, "upload failed: {}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "sunset.png");
    assert_eq!(body["data"]["ext"], ".png");
    assert_eq!(body["data"]["mime"], "image/png");
    assert_eq!(body["data"]["alternativeText"], "Sunset");
    assert_eq!(body["usage"]["example"], "update with data: { image: 1 }");

    assert_eq!(gateway.uploads.contents(1).await.unwrap(), PNG_BYTES);
    Ok(())
}

#[tokio::test]
async fn test_upload_prefers_metadata_name() -> Result<()> {
    let addr = spawn_origin().await?;
    let gateway = TestGateway::new();

    let (body, is_error) = gateway
        .call(
            "upload_media",
            json!({
                "url": format!("http://{}/images/sunset.png", addr),
                "name": "hero-banner.png",
                "caption": ""
            }),
        )
        .await;

    assert!(!is_error);
    assert_eq!(body["data"]["name"], "hero-banner.png");
    assert!(body["data"]["caption"].is_null());
    Ok(())
}

#[tokio::test]
async fn test_upload_falls_back_to_default_name() -> Result<()> {
    let addr = spawn_origin().await?;
    let gateway = TestGateway::new();

    let (body, is_error) = gateway
        .call("upload_media", json!({ "url": format!("http://{}/raw/", addr) }))
        .await;

    assert!(!is_error);
    assert_eq!(body["data"]["name"], DEFAULT_FILENAME);
    assert!(body["data"]["mime"].as_str().unwrap().starts_with("text/plain"));
    Ok(())
}

#[tokio::test]
async fn test_upload_reports_origin_status() -> Result<()> {
    let addr = spawn_origin().await?;
    let gateway = TestGateway::new();

    let (body, is_error) = gateway
        .call("upload_media", json!({ "url": format!("http://{}/gone.png", addr) }))
        .await;

    assert!(is_error);
    assert_eq!(body["message"], "Failed to fetch image from URL: Not Found");
    assert_eq!(body["tool"], "upload_media");
    assert!(gateway.uploads.is_empty().await);
    Ok(())
}
