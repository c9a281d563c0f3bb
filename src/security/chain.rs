//! The security middleware wrapped around every `/api` request.
//!
//! Order: cookie logging, principal resolution (Basic header, then session
//! cookie), route policy. Requests that pass carry the [`Principal`] in their
//! extensions. Rules built with `without_principal` (login and logout) skip
//! resolution, so a stale `Authorization` header cannot block them.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

use super::{
    basic,
    error::AuthError,
    policy::Decision,
    principal::Principal,
    session::{cookie_names, extract_session_token},
    SecurityState,
};

pub const API_PREFIX: &str = "/api";

/// Paths guarded by the chain: `/api` and everything below it.
#[must_use]
pub fn is_api_path(path: &str) -> bool {
    path.strip_prefix(API_PREFIX)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

pub async fn security_chain(
    State(state): State<Arc<SecurityState>>,
    mut request: Request,
    next: Next,
) -> Response {
    if !is_api_path(request.uri().path()) {
        return next.run(request).await;
    }

    let names = cookie_names(request.headers());
    if !names.is_empty() {
        debug!(cookies = ?names, "request cookies");
    }

    let principal = if state
        .policy()
        .resolves_principal(request.method(), request.uri().path())
    {
        match resolve_principal(&state, request.headers()).await {
            Ok(principal) => principal,
            Err(err) => return err.into_response(),
        }
    } else {
        None
    };

    let decision = state.policy().decide(
        request.method(),
        request.uri().path(),
        principal.as_ref(),
    );

    match decision {
        Decision::Grant => {}
        Decision::Unauthenticated => {
            debug!(path = request.uri().path(), "authentication required");
            return AuthError::Unauthenticated.into_response();
        }
        Decision::Forbidden => {
            debug!(path = request.uri().path(), "access denied");
            return AuthError::Forbidden.into_response();
        }
    }

    if let Some(principal) = principal {
        request.extensions_mut().insert(principal);
    }

    next.run(request).await
}

async fn resolve_principal(
    state: &SecurityState,
    headers: &HeaderMap,
) -> Result<Option<Principal>, AuthError> {
    if let Some(credentials) = basic::parse(headers) {
        let principal = state.authenticator().authenticate(credentials?).await?;
        return Ok(Some(principal));
    }

    match extract_session_token(headers) {
        Some(token) => Ok(state.sessions().get(&token).await),
        None => Ok(None),
    }
}
