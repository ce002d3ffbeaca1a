use crate::domain::paste::Paste;
use crate::services::paste_service::NewPaste;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw creation payload. Fields are kept as JSON values so that type errors surface
/// as field-specific validation messages rather than generic decode failures.
#[derive(Debug, Deserialize)]
pub struct CreatePasteRequest {
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub ttl_seconds: Option<Value>,
    #[serde(default)]
    pub max_views: Option<Value>,
}

impl CreatePasteRequest {
    /// Checks field types. Range checks happen in the paste service.
    ///
    /// # Errors
    /// Returns a message naming the field with the wrong type.
    pub fn into_new_paste(self) -> Result<NewPaste, String> {
        let content = match self.content {
            Some(Value::String(content)) => content,
            _ => return Err("Content is required".into()),
        };

        Ok(NewPaste {
            content,
            ttl_seconds: integer_field(self.ttl_seconds).ok_or("Invalid ttl_seconds")?,
            max_views: integer_field(self.max_views).ok_or("Invalid max_views")?,
        })
    }
}

/// `None` for a wrong type, `Some(None)` for absent or `null`.
fn integer_field(value: Option<Value>) -> Option<Option<i64>> {
    match value {
        None | Some(Value::Null) => Some(None),
        Some(Value::Number(n)) => n.as_i64().map(Some),
        Some(_) => None,
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePasteResponse {
    pub id: String,
    pub url: String,
}

/// Caller-facing paste. Unset limits serialize as `null`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PasteView {
    pub id: String,
    pub content: String,
    pub created_at: i64,
    pub expires_at: Option<i64>,
    pub max_views: Option<i64>,
    pub remaining_views: Option<i64>,
}

impl From<Paste> for PasteView {
    fn from(paste: Paste) -> Self {
        Self {
            id: paste.id,
            content: paste.content,
            created_at: paste.created_at,
            expires_at: paste.expires_at,
            max_views: paste.max_views,
            remaining_views: paste.remaining_views,
        }
    }
}
