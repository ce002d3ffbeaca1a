use crate::config::StorageConfig;
use backon::{ExponentialBuilder, Retryable};
use std::sync::Arc;
use std::time::Duration;

pub mod paste_repo;

pub use paste_repo::PasteRepository;

#[derive(Debug, Clone)]
pub struct RedisClient {
    connection: redis::aio::ConnectionManager,
}

impl RedisClient {
    /// Connects to Redis, retrying the initial connection with exponential backoff.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or every connection attempt fails.
    pub async fn connect(config: &StorageConfig) -> anyhow::Result<Arc<Self>> {
        let client = redis::Client::open(config.redis_url.as_str())?;

        let retry_strategy = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(config.connect_min_backoff_ms))
            .with_max_delay(Duration::from_millis(config.connect_max_backoff_ms))
            .with_max_times(config.connect_max_attempts);

        let connection = (|| async { client.get_connection_manager().await })
            .retry(retry_strategy)
            .notify(|e, duration| {
                tracing::warn!(error = %e, retry_in = ?duration, "Redis connection failed, retrying...");
            })
            .await?;

        tracing::info!("Connected to Redis");
        Ok(Arc::new(Self { connection }))
    }

    /// Returns a handle to the shared multiplexed connection.
    #[must_use]
    pub fn connection(&self) -> redis::aio::ConnectionManager {
        self.connection.clone()
    }

    /// Pings the Redis server to check connectivity.
    ///
    /// # Errors
    /// Returns an error if the ping fails.
    pub async fn ping(&self) -> redis::RedisResult<()> {
        let mut conn = self.connection();
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }
}
