use super::handlers::{health, login, logout, me, ping};
use utoipa::OpenApi;

/// `OpenAPI` document served at `/openapi.json`.
///
/// Info (title, version, description, contact, license) comes from Cargo.toml.
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        login::login,
        logout::logout,
        me::me,
        ping::ping,
    ),
    components(schemas(
        health::Health,
        login::LoginRequest,
        logout::LogoutResponse,
        me::MeResponse,
        ping::Pong,
    )),
    tags(
        (name = "auth", description = "Session login, logout and the current principal"),
        (name = "public", description = "Anonymous endpoints under /api/public"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = openapi();
        for path in [
            "/health",
            "/api/login",
            "/api/logout",
            "/api/me",
            "/api/public/ping",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn info_comes_from_cargo() {
        let doc = openapi();
        assert_eq!(doc.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(doc.info.version, env!("CARGO_PKG_VERSION"));
    }
}
