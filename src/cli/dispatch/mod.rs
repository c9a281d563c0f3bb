use crate::cli::{
    actions::{server::Args, Action},
    commands::{
        auth::{ARG_BCRYPT_COST, ARG_SESSION_COOKIE_SECURE, ARG_SESSION_TTL_SECONDS},
        ARG_DB_MAX_CONNECTIONS, ARG_DSN, ARG_PORT,
    },
};
use crate::security::{password::DEFAULT_COST, session::DEFAULT_SESSION_TTL_SECONDS};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::time::Duration;

/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .context("missing required argument: --dsn")?;

    let db_max_connections = matches
        .get_one::<u32>(ARG_DB_MAX_CONNECTIONS)
        .copied()
        .unwrap_or(5);
    let session_ttl = matches
        .get_one::<u64>(ARG_SESSION_TTL_SECONDS)
        .copied()
        .unwrap_or(DEFAULT_SESSION_TTL_SECONDS);
    let bcrypt_cost = matches
        .get_one::<u32>(ARG_BCRYPT_COST)
        .copied()
        .unwrap_or(DEFAULT_COST);

    Ok(Action::Server(Args {
        port,
        dsn: SecretString::from(dsn),
        db_max_connections,
        session_ttl: Duration::from_secs(session_ttl),
        session_cookie_secure: matches.get_flag(ARG_SESSION_COOKIE_SECURE),
        bcrypt_cost,
    }))
}
