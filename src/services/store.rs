use crate::domain::paste::Paste;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage backend unavailable: {0}")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Stored paste {id} is corrupt: {reason}")]
    Corrupt { id: String, reason: String },
    #[error("Failed to encode paste: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        Self::Unavailable(Box::new(e))
    }
}

/// Key-value backend for pastes.
///
/// `consume` must be linearizable per id: for a given id, no two calls may interleave
/// their check and decrement, even across service processes sharing the backend.
#[async_trait]
pub trait PasteStore: Send + Sync + std::fmt::Debug {
    /// Stores a new paste unless its id is already taken.
    ///
    /// Returns `false` on an id collision, leaving the existing paste untouched.
    ///
    /// # Errors
    /// Returns `StoreError::Unavailable` if the backend cannot be reached.
    async fn insert(&self, paste: &Paste) -> Result<bool, StoreError>;

    /// Atomically applies one read to the paste at logical time `now_ms`.
    ///
    /// Returns `None` for a missing, time-expired or view-exhausted paste. A served
    /// read on a view-limited paste has already been persisted when this returns.
    ///
    /// # Errors
    /// Returns `StoreError::Unavailable` if the backend fails and `StoreError::Corrupt`
    /// if the stored value cannot be decoded. Neither leaves a partial update behind.
    async fn consume(&self, id: &str, now_ms: i64) -> Result<Option<Paste>, StoreError>;

    /// Checks backend connectivity.
    ///
    /// # Errors
    /// Returns `StoreError::Unavailable` if the backend cannot be reached.
    async fn ping(&self) -> Result<(), StoreError>;
}
