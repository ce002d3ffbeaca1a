use crate::api::AppState;
use crate::api::middleware::RequestTime;
use crate::api::schemas::pastes::{CreatePasteRequest, CreatePasteResponse, PasteView};
use crate::error::{AppError, Result};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, header},
    response::IntoResponse,
};

/// Creates a paste.
///
/// # Errors
/// Returns `AppError::BadRequest` if the body is not JSON or a field is invalid.
pub async fn create_paste(
    State(state): State<AppState>,
    RequestTime(now_ms): RequestTime,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let request: CreatePasteRequest =
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))?;
    let new_paste = request.into_new_paste().map_err(AppError::BadRequest)?;

    let paste = state.paste_service.create(new_paste, now_ms).await?;

    let url = format!("{}/p/{}", base_url(state.config.server.public_base_url.as_deref(), &headers), paste.id);
    Ok(Json(CreatePasteResponse { id: paste.id, url }))
}

/// Fetches a paste, spending one view if it is view-limited.
///
/// # Errors
/// Returns `AppError::NotFound` if the paste is missing, expired or out of views.
pub async fn get_paste(
    State(state): State<AppState>,
    RequestTime(now_ms): RequestTime,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let paste = state.paste_service.retrieve(&id, now_ms).await?;
    Ok(Json(PasteView::from(paste)))
}

fn base_url(configured: Option<&str>, headers: &HeaderMap) -> String {
    if let Some(base) = configured {
        return base.trim_end_matches('/').to_string();
    }
    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok()).unwrap_or("localhost");
    format!("http://{host}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_base_url_prefers_configured_origin() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("internal:3000"));

        assert_eq!(base_url(Some("https://paste.example.com/"), &headers), "https://paste.example.com");
        assert_eq!(base_url(None, &headers), "http://internal:3000");
        assert_eq!(base_url(None, &HeaderMap::new()), "http://localhost");
    }
}
