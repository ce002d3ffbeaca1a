#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod telemetry;

use crate::api::ServiceContainer;
use crate::config::{Config, StorageBackend};
use crate::services::health_service::HealthService;
use crate::services::id_generator::{IdGenerator, RandomIdGenerator};
use crate::services::paste_service::PasteService;
use crate::services::store::PasteStore;
use std::sync::Arc;
use tokio::sync::watch;

/// Opens the paste store selected by the configuration.
///
/// # Errors
/// Returns an error if the Redis backend cannot be reached.
pub async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn PasteStore>> {
    match config.storage.backend {
        StorageBackend::Redis => {
            let client = adapters::redis::RedisClient::connect(&config.storage).await?;
            Ok(Arc::new(adapters::redis::PasteRepository::new(client, config.storage.key_prefix.clone())))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory paste store; pastes will not survive a restart");
            Ok(Arc::new(adapters::memory::MemoryPasteStore::new()))
        }
    }
}

#[derive(Debug)]
pub struct App {
    pub services: ServiceContainer,
    pub health_service: HealthService,
}

#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    store: Option<Arc<dyn PasteStore>>,
    ids: Option<Arc<dyn IdGenerator>>,
}

impl AppBuilder {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config, store: None, ids: None }
    }

    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn PasteStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Wires the services together.
    ///
    /// # Errors
    /// Returns an error if no store was provided.
    pub fn build(self) -> anyhow::Result<App> {
        let store = self.store.ok_or_else(|| anyhow::anyhow!("Paste store is required"))?;
        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(RandomIdGenerator::new(usize::from(self.config.paste.id_length))));

        let paste_service = PasteService::new(Arc::clone(&store), ids, self.config.paste.clone());
        let health_service = HealthService::new(store, self.config.health.clone());

        if self.config.clock.test_mode {
            tracing::warn!("Test mode enabled: the x-test-now-ms header overrides the clock");
        }

        Ok(App {
            services: ServiceContainer { paste_service, health_service: health_service.clone() },
            health_service,
        })
    }
}

/// Routes panics through `tracing` before the default hook runs.
pub fn setup_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info.location().map(|l| format!("{}:{}", l.file(), l.line())).unwrap_or_default();
        tracing::error!(panic = %info, location = %location, "Panic occurred");
        default_hook(info);
    }));
}

/// Flips the shutdown channel on SIGINT or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => {},
            () = terminate => {},
        }

        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });
}
