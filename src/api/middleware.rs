use crate::api::AppState;
use crate::services::clock::TEST_NOW_HEADER;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

/// The logical time for this request, resolved once at the edge.
///
/// In test mode the `x-test-now-ms` header wins; otherwise the wall clock is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTime(pub i64);

impl FromRequestParts<AppState> for RequestTime {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let injected = parts.headers.get(TEST_NOW_HEADER).and_then(|v| v.to_str().ok());
        Ok(Self(state.clock.now_ms(injected)))
    }
}
