use axum::{extract::Extension, response::Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::security::Principal;

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub username: String,
    pub authorities: Vec<String>,
}

impl From<Principal> for MeResponse {
    fn from(principal: Principal) -> Self {
        Self {
            username: principal.username,
            // BTreeSet iterates in sorted order
            authorities: principal.authorities.into_iter().collect(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "The authenticated principal", body = MeResponse),
        (status = 401, description = "No session cookie or Basic credentials")
    ),
    tag = "auth"
)]
pub async fn me(Extension(principal): Extension<Principal>) -> Json<MeResponse> {
    Json(MeResponse::from(principal))
}
