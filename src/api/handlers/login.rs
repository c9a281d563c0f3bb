//! `POST /api/login`
//!
//! Flow:
//! 1) Read the credential pair from a JSON body or from form fields.
//! 2) Authenticate it against the user repository.
//! 3) Rotate the session and answer with a bare `200` plus `Set-Cookie`.

use axum::{
    body::Bytes,
    extract::{Extension, RawQuery},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

use crate::security::{
    credentials,
    error::AuthError,
    session::{extract_session_token, session_cookie},
    SecurityState,
};

/// Documented JSON shape; form bodies carry the same two fields.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/api/login",
    request_body(
        content = LoginRequest,
        description = "JSON object or `application/x-www-form-urlencoded` fields",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Authenticated, session cookie issued"),
        (status = 400, description = "Malformed JSON body"),
        (status = 401, description = "Bad credentials"),
        (status = 500, description = "User lookup failed")
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    Extension(state): Extension<Arc<SecurityState>>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    match try_login(&state, &headers, query.as_deref(), &body).await {
        Ok(response) => response,
        Err(err) => {
            debug!("Login rejected: {err}");
            err.into_response()
        }
    }
}

async fn try_login(
    state: &SecurityState,
    headers: &HeaderMap,
    query: Option<&str>,
    body: &[u8],
) -> Result<Response, AuthError> {
    let credentials = credentials::extract(headers, query, body)?;
    let principal = state.authenticator().authenticate(credentials).await?;

    // A fresh token on every login, the previous one stops resolving
    if let Some(previous) = extract_session_token(headers) {
        state.sessions().invalidate(&previous).await;
    }
    let token = state.sessions().create(principal).await?;

    let cookie = session_cookie(&token, state.sessions().ttl(), state.cookie_secure())
        .map_err(|e| AuthError::Internal(e.into()))?;

    Ok((StatusCode::OK, [(SET_COOKIE, cookie)]).into_response())
}
