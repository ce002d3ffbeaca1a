use serde::{Deserialize, Serialize};

/// A stored paste.
///
/// All timestamps are logical milliseconds since the Unix epoch. Unset optional
/// fields are omitted from the stored JSON so that the Redis consume script sees
/// them as `nil`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paste {
    pub id: String,
    pub content: String,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_views: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_views: Option<i64>,
}

impl Paste {
    /// A paste is readable up to and including `expires_at`.
    #[must_use]
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        self.expires_at.is_some_and(|expires_at| now_ms > expires_at)
    }

    #[must_use]
    pub const fn is_view_limited(&self) -> bool {
        self.max_views.is_some()
    }

    /// Applies one read at `now_ms`.
    ///
    /// Returns `None` without touching the paste if it is time-expired or out of
    /// views. Otherwise decrements `remaining_views` (view-limited pastes only) and
    /// returns a snapshot of the updated paste. Callers must hold exclusive access
    /// to the stored value for the duration of the call.
    pub fn consume_at(&mut self, now_ms: i64) -> Option<Self> {
        if self.is_expired_at(now_ms) {
            return None;
        }

        if self.is_view_limited() {
            match self.remaining_views {
                Some(remaining) if remaining > 0 => self.remaining_views = Some(remaining - 1),
                _ => return None,
            }
        }

        Some(self.clone())
    }
}
