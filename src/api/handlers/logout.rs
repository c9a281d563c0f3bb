use axum::{
    extract::Extension,
    http::{
        header::{CONTENT_TYPE, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

use crate::security::{
    session::{clear_session_cookie, extract_session_token},
    SecurityState,
};

/// Written byte for byte, clients compare it verbatim.
pub const LOGOUT_BODY: &str = r#"{"success": true, "message": "Logout successful"}"#;

/// Schema of [`LOGOUT_BODY`].
#[derive(Debug, Serialize, ToSchema)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

/// Only routed for POST, other methods get `405`. The cookie is `SameSite=Strict`
/// and there is no CSRF token, so a cross-site GET must not end a session.
#[utoipa::path(
    post,
    path = "/api/logout",
    responses(
        (status = 200, description = "Session invalidated, cookie cleared", body = LogoutResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn logout(Extension(state): Extension<Arc<SecurityState>>, headers: HeaderMap) -> Response {
    if let Some(token) = extract_session_token(&headers) {
        if state.sessions().invalidate(&token).await {
            debug!("Session invalidated");
        }
    }

    let mut response = (
        StatusCode::OK,
        [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        LOGOUT_BODY,
    )
        .into_response();

    match clear_session_cookie(state.cookie_secure()) {
        Ok(cookie) => {
            response.headers_mut().insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build logout cookie: {err}"),
    }

    response
}
