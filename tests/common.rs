#![allow(dead_code, clippy::unwrap_used, clippy::missing_panics_doc, unreachable_pub)]
use pastebin_lite::adapters::memory::MemoryPasteStore;
use pastebin_lite::api::{self, MgmtState};
use pastebin_lite::config::{Config, StorageBackend};
use pastebin_lite::services::store::PasteStore;
use pastebin_lite::AppBuilder;
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;

pub const TEST_NOW_HEADER: &str = "x-test-now-ms";

pub fn get_test_config() -> Config {
    let mut config = Config::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config.server.mgmt_port = 0;
    config.storage.backend = StorageBackend::Memory;
    config.clock.test_mode = true;
    config
}

pub struct TestApp {
    pub server_url: String,
    pub mgmt_url: String,
    pub client: reqwest::Client,
    pub config: Config,
    pub store: Arc<MemoryPasteStore>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_config(get_test_config()).await
    }

    pub async fn spawn_with_config(config: Config) -> Self {
        let store = Arc::new(MemoryPasteStore::new());
        Self::spawn_with_store(config, store.clone(), store).await
    }

    /// Spawns the routers over `store`. `memory` is kept for assertions on stored state.
    pub async fn spawn_with_store(config: Config, store: Arc<dyn PasteStore>, memory: Arc<MemoryPasteStore>) -> Self {
        pastebin_lite::telemetry::init_test_telemetry();

        let app = AppBuilder::new(config.clone()).with_store(store).build().unwrap();
        let app_router = api::app_router(config.clone(), app.services);
        let mgmt_app = api::mgmt_router(MgmtState { health_service: app.health_service });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server_url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app_router).await.unwrap();
        });

        let mgmt_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mgmt_url = format!("http://{}", mgmt_listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(mgmt_listener, mgmt_app).await.unwrap();
        });

        Self { server_url, mgmt_url, client: reqwest::Client::new(), config, store: memory }
    }

    pub async fn create_paste(&self, body: Value, now_ms: Option<i64>) -> reqwest::Response {
        let mut req = self.client.post(format!("{}/api/pastes", self.server_url)).json(&body);
        if let Some(now) = now_ms {
            req = req.header(TEST_NOW_HEADER, now.to_string());
        }
        req.send().await.unwrap()
    }

    /// Creates a paste and returns its id, asserting success.
    pub async fn create_paste_id(&self, body: Value, now_ms: Option<i64>) -> String {
        let resp = self.create_paste(body, now_ms).await;
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let json: Value = resp.json().await.unwrap();
        json["id"].as_str().unwrap().to_string()
    }

    pub async fn get_paste(&self, id: &str, now_ms: Option<i64>) -> reqwest::Response {
        let mut req = self.client.get(format!("{}/api/pastes/{id}", self.server_url));
        if let Some(now) = now_ms {
            req = req.header(TEST_NOW_HEADER, now.to_string());
        }
        req.send().await.unwrap()
    }
}
