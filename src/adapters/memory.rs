use crate::domain::paste::Paste;
use crate::services::store::{PasteStore, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Process-local paste store.
///
/// Each `consume` runs under the write lock of the shard holding the key, which
/// serializes reads of the same paste. Only suitable for a single service process.
#[derive(Debug, Default)]
pub struct MemoryPasteStore {
    pastes: DashMap<String, Paste>,
}

impl MemoryPasteStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pastes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pastes.is_empty()
    }

    /// Returns the stored paste without applying a read.
    #[must_use]
    pub fn peek(&self, id: &str) -> Option<Paste> {
        self.pastes.get(id).map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl PasteStore for MemoryPasteStore {
    async fn insert(&self, paste: &Paste) -> Result<bool, StoreError> {
        match self.pastes.entry(paste.id.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(paste.clone());
                Ok(true)
            }
        }
    }

    async fn consume(&self, id: &str, now_ms: i64) -> Result<Option<Paste>, StoreError> {
        Ok(self.pastes.get_mut(id).and_then(|mut entry| entry.consume_at(now_ms)))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn paste(id: &str, max_views: Option<i64>) -> Paste {
        Paste {
            id: id.to_string(),
            content: "body".to_string(),
            created_at: 0,
            expires_at: None,
            max_views,
            remaining_views: max_views,
        }
    }

    #[tokio::test]
    async fn test_insert_rejects_taken_id() {
        let store = MemoryPasteStore::new();
        assert!(store.insert(&paste("a", None)).await.unwrap());

        let mut other = paste("a", Some(1));
        other.content = "other".to_string();
        assert!(!store.insert(&other).await.unwrap());
        assert_eq!(store.peek("a").unwrap().content, "body");
    }

    #[tokio::test]
    async fn test_consume_missing_is_none() {
        let store = MemoryPasteStore::new();
        assert!(store.consume("nope", 0).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_consume_persists_decrement() {
        let store = MemoryPasteStore::new();
        store.insert(&paste("a", Some(3))).await.unwrap();

        let seen = store.consume("a", 0).await.unwrap().unwrap();
        assert_eq!(seen.remaining_views, Some(2));
        assert_eq!(store.peek("a").unwrap().remaining_views, Some(2));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_consumers_never_overspend() {
        let store = Arc::new(MemoryPasteStore::new());
        store.insert(&paste("hot", Some(7))).await.unwrap();

        let tasks: Vec<_> = (0..64)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.consume("hot", 0).await.unwrap() })
            })
            .collect();

        let mut served = 0;
        for task in tasks {
            if task.await.unwrap().is_some() {
                served += 1;
            }
        }

        assert_eq!(served, 7);
        assert_eq!(store.peek("hot").unwrap().remaining_views, Some(0));
    }
}
