use crate::{security::SecurityState, GIT_COMMIT_HASH};
use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time::{timeout, Duration};
use tracing::{debug, error, warn};
use utoipa::ToSchema;

const HEALTH_DB_TIMEOUT_SECONDS: u64 = 2;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    database: String,
}

#[utoipa::path(
    get,
    path= "/health",
    responses (
        (status = 200, description = "User store is reachable", body = Health),
        (status = 503, description = "User store is unreachable", body = Health)
    ),
    tag = "health",
)]
// axum handler for health
pub async fn health(
    method: Method,
    Extension(state): Extension<Arc<SecurityState>>,
) -> impl IntoResponse {
    let db_healthy = probe(&state).await;

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if db_healthy {
            "ok".to_string()
        } else {
            "error".to_string()
        },
    };

    let body = if method == Method::GET {
        Json(&health).into_response()
    } else {
        Body::empty().into_response()
    };

    let short_hash = if health.commit.len() > 7 {
        &health.commit[0..7]
    } else {
        ""
    };

    let headers = format!("{}:{}:{}", health.name, health.version, short_hash)
        .parse::<HeaderValue>()
        .map(|x_app_header_value| {
            debug!("X-App header: {:?}", x_app_header_value);

            let mut headers = HeaderMap::new();
            headers.insert("X-App", x_app_header_value);
            headers
        })
        .map_err(|err| {
            debug!("Failed to parse X-App header: {}", err);
        })
        .unwrap_or_else(|()| HeaderMap::new());

    if db_healthy {
        (StatusCode::OK, headers, body)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, headers, body)
    }
}

async fn probe(state: &SecurityState) -> bool {
    let users = state.authenticator().users();
    match timeout(Duration::from_secs(HEALTH_DB_TIMEOUT_SECONDS), users.ping()).await {
        Ok(Ok(())) => {
            debug!("User store is healthy");
            true
        }
        Ok(Err(err)) => {
            error!("User store ping failed: {err:#}");
            false
        }
        Err(_) => {
            warn!("User store health check timed out");
            false
        }
    }
}
