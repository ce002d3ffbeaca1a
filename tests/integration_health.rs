#![allow(clippy::unwrap_used, clippy::missing_panics_doc, unreachable_pub)]
use async_trait::async_trait;
use pastebin_lite::adapters::memory::MemoryPasteStore;
use pastebin_lite::domain::paste::Paste;
use pastebin_lite::services::store::{PasteStore, StoreError};
use reqwest::StatusCode;
use serde_json::json;
use std::sync::Arc;
mod common;

#[derive(Debug)]
struct UnreachableStore;

#[async_trait]
impl PasteStore for UnreachableStore {
    async fn insert(&self, _paste: &Paste) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn consume(&self, _id: &str, _now_ms: i64) -> Result<Option<Paste>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

async fn spawn_unreachable() -> common::TestApp {
    common::TestApp::spawn_with_store(
        common::get_test_config(),
        Arc::new(UnreachableStore),
        Arc::new(MemoryPasteStore::new()),
    )
    .await
}

#[tokio::test]
async fn test_livez() {
    let app = common::TestApp::spawn().await;

    let resp = app.client.get(format!("{}/livez", app.mgmt_url)).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_readyz_happy_path() {
    let app = common::TestApp::spawn().await;

    let resp = app.client.get(format!("{}/readyz", app.mgmt_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "ok");
}

#[tokio::test]
async fn test_healthz_happy_path() {
    let app = common::TestApp::spawn().await;

    let resp = app.client.get(format!("{}/api/healthz", app.server_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<serde_json::Value>().await.unwrap(), json!({ "ok": true }));
}

#[tokio::test]
async fn test_storage_outage_reports_unhealthy() {
    let app = spawn_unreachable().await;

    let resp = app.client.get(format!("{}/readyz", app.mgmt_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["storage"], "error");

    let resp = app.client.get(format!("{}/api/healthz", app.server_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(resp.json::<serde_json::Value>().await.unwrap(), json!({ "ok": false }));
}

#[tokio::test]
async fn test_storage_outage_is_not_a_missing_paste() {
    let app = spawn_unreachable().await;

    assert_eq!(app.get_paste("anything", None).await.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        app.create_paste(json!({ "content": "x" }), None).await.status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
}
