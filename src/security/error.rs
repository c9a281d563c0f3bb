use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub const MALFORMED_BODY_MESSAGE: &str = "Malformed request body";

/// Terminal outcomes of the security chain and the login flow.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("malformed request body: {0}")]
    MalformedBody(String),
    #[error("bad credentials")]
    BadCredentials,
    #[error("authentication required")]
    Unauthenticated,
    #[error("access denied")]
    Forbidden,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Self::BadCredentials | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::MalformedBody(_) => (
                self.status(),
                Json(json!({ "success": false, "message": MALFORMED_BODY_MESSAGE })),
            )
                .into_response(),
            Self::Internal(ref err) => {
                error!("Authentication failed internally: {err:#}");
                self.status().into_response()
            }
            // Status line only, no body
            Self::BadCredentials | Self::Unauthenticated | Self::Forbidden => {
                self.status().into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn maps_status_codes() {
        assert_eq!(
            AuthError::MalformedBody("x".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::BadCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::Internal(anyhow!("db down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn bad_credentials_and_unauthenticated_look_the_same() {
        let first = AuthError::BadCredentials.into_response();
        let second = AuthError::Unauthenticated.into_response();
        assert_eq!(first.status(), second.status());
        assert_eq!(first.headers().len(), second.headers().len());
    }
}
