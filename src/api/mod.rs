use crate::{
    api::handlers::{health, login, logout, me, not_found, ping},
    cli::actions::server::Args,
    security::{
        chain::security_chain,
        session::spawn_purge_task,
        Authenticator, PasswordEncoder, Policy, SecurityState, SessionStore,
    },
    users::{PgUserRepository, UserRepository},
};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{debug_span, error, info, Span};
use ulid::Ulid;

pub mod handlers;
pub mod openapi;

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Build the application router around an already assembled [`SecurityState`].
///
/// Every route, the fallback included, sits behind the security chain; the
/// chain itself only acts on `/api` paths.
#[must_use]
pub fn router(state: Arc<SecurityState>) -> Router {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/me", get(me))
        .route("/api/public/ping", get(ping))
        .route("/health", get(health).options(health))
        .route("/openapi.json", get(openapi_json))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), security_chain))
        .layer(Extension(state))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span)),
        )
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi::openapi())
}

/// Connect the user store, assemble the security state and serve until a
/// shutdown signal arrives.
///
/// # Errors
/// Returns an error if the database is unreachable, the configuration is
/// invalid or the listener cannot be bound.
pub async fn new(args: Args) -> Result<()> {
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(args.db_max_connections)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(args.dsn.expose_secret())
        .await
        .context("Failed to connect to database")?;

    let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool));
    let encoder = PasswordEncoder::new(args.bcrypt_cost)?;
    let authenticator = Authenticator::new(users, encoder)?;

    let sessions = Arc::new(SessionStore::new(args.session_ttl));
    let purge = spawn_purge_task(sessions.clone(), SESSION_PURGE_INTERVAL);

    let policy = Policy::default_api()?;
    let state = Arc::new(
        SecurityState::new(authenticator, sessions, policy)
            .with_cookie_secure(args.session_cookie_secure),
    );

    let app = router(state);

    let listener = TcpListener::bind(format!("::0:{}", args.port))
        .await
        .with_context(|| format!("Failed to bind port {}", args.port))?;

    info!("Listening on [::]:{}", args.port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    purge.abort();
    info!("Gracefully shutdown");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

// span, cookies and credentials stay out of it
fn make_span(request: &Request<Body>) -> Span {
    let method = request.method().as_str();
    let path = request.uri().path();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!("http-request", method, path, request_id)
}
