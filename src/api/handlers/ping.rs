use axum::response::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct Pong {
    pub success: bool,
    pub message: String,
}

#[utoipa::path(
    get,
    path = "/api/public/ping",
    responses(
        (status = 200, description = "Anonymous liveness check inside the API surface", body = Pong)
    ),
    tag = "public"
)]
pub async fn ping() -> Json<Pong> {
    Json(Pong {
        success: true,
        message: "pong".to_string(),
    })
}
