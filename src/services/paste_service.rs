use crate::config::PasteConfig;
use crate::domain::paste::Paste;
use crate::error::{AppError, Result};
use crate::services::id_generator::IdGenerator;
use crate::services::store::PasteStore;
use opentelemetry::{KeyValue, global, metrics::Counter};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub(crate) struct Metrics {
    pub(crate) created_total: Counter<u64>,
    pub(crate) views_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("pastebin-lite");
        Self {
            created_total: meter
                .u64_counter("pastebin_pastes_created_total")
                .with_description("Total pastes successfully created")
                .build(),
            views_total: meter
                .u64_counter("pastebin_paste_views_total")
                .with_description("Paste retrievals by outcome")
                .build(),
        }
    }
}

/// A creation request as received from the caller, before range validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaste {
    pub content: String,
    pub ttl_seconds: Option<i64>,
    pub max_views: Option<i64>,
}

impl NewPaste {
    /// Checks the request and computes the absolute expiry for a paste created at `now_ms`.
    ///
    /// # Errors
    /// Returns `AppError::BadRequest` naming the offending field.
    fn expires_at(&self, now_ms: i64) -> Result<Option<i64>> {
        if self.content.trim().is_empty() {
            return Err(AppError::BadRequest("Content is required".into()));
        }
        if self.max_views.is_some_and(|views| views < 1) {
            return Err(AppError::BadRequest("Invalid max_views".into()));
        }

        match self.ttl_seconds {
            None => Ok(None),
            Some(ttl) if ttl >= 1 => ttl
                .checked_mul(1000)
                .and_then(|ttl_ms| now_ms.checked_add(ttl_ms))
                .map(Some)
                .ok_or_else(|| AppError::BadRequest("Invalid ttl_seconds".into())),
            Some(_) => Err(AppError::BadRequest("Invalid ttl_seconds".into())),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PasteService {
    store: Arc<dyn PasteStore>,
    ids: Arc<dyn IdGenerator>,
    config: PasteConfig,
    metrics: Metrics,
}

impl PasteService {
    #[must_use]
    pub fn new(store: Arc<dyn PasteStore>, ids: Arc<dyn IdGenerator>, config: PasteConfig) -> Self {
        Self { store, ids, config, metrics: Metrics::new() }
    }

    /// Validates and stores a new paste created at logical time `now_ms`.
    ///
    /// Nothing is written when validation fails. An id collision is retried with a
    /// fresh id up to the configured number of attempts.
    ///
    /// # Errors
    /// Returns `AppError::BadRequest` for invalid input, `AppError::Store` if the backend
    /// fails, and `AppError::Internal` if no free id was found.
    #[tracing::instrument(
        err(level = "debug"),
        skip(self, new_paste),
        fields(ttl_seconds = ?new_paste.ttl_seconds, max_views = ?new_paste.max_views, paste_id = tracing::field::Empty)
    )]
    pub async fn create(&self, new_paste: NewPaste, now_ms: i64) -> Result<Paste> {
        let expires_at = new_paste.expires_at(now_ms)?;
        let NewPaste { content, max_views, .. } = new_paste;

        for attempt in 1..=self.config.id_max_attempts {
            let paste = Paste {
                id: self.ids.generate(),
                content: content.clone(),
                created_at: now_ms,
                expires_at,
                max_views,
                remaining_views: max_views,
            };

            if self.store.insert(&paste).await? {
                tracing::Span::current().record("paste_id", paste.id.as_str());
                tracing::debug!("Paste stored");
                self.metrics.created_total.add(1, &[]);
                return Ok(paste);
            }

            tracing::warn!(attempt, "Paste id collision, generating a new id");
        }

        tracing::error!(attempts = self.config.id_max_attempts, "Could not allocate a free paste id");
        Err(AppError::Internal)
    }

    /// Applies one read to the paste at logical time `now_ms`.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the paste is missing, expired or out of views, and
    /// `AppError::Store` if the backend fails.
    #[tracing::instrument(err(level = "debug"), skip(self))]
    pub async fn retrieve(&self, id: &str, now_ms: i64) -> Result<Paste> {
        match self.store.consume(id, now_ms).await {
            Ok(Some(paste)) => {
                self.metrics.views_total.add(1, &[KeyValue::new("outcome", "served")]);
                Ok(paste)
            }
            Ok(None) => {
                self.metrics.views_total.add(1, &[KeyValue::new("outcome", "not_found")]);
                Err(AppError::NotFound)
            }
            Err(e) => {
                self.metrics.views_total.add(1, &[KeyValue::new("outcome", "error")]);
                Err(e.into())
            }
        }
    }
}
