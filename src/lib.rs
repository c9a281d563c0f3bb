//! # caslogin
//!
//! Session based login service for the `/api` surface.
//!
//! ## Request pipeline
//!
//! Every request under `/api` passes through an explicit security chain before
//! reaching a handler:
//!
//! 1. The principal is resolved from an `Authorization: Basic` header or from the
//!    `caslogin_session` cookie.
//! 2. The route policy is evaluated top to bottom, first match wins. Missing
//!    principals get a bare `401`, principals without the required authority a
//!    bare `403`.
//! 3. `POST /api/login` extracts a credential pair from either a JSON or a
//!    form-encoded body, authenticates it against the user repository and, on
//!    success, issues a fresh session cookie.
//!
//! ## Credentials
//!
//! Passwords are stored as bcrypt hashes. Unknown usernames and wrong passwords
//! produce the same `401` so that username existence is never leaked.
//!
//! ## Sessions
//!
//! Sessions live in process memory with an idle timeout. The cookie is
//! `HttpOnly` and `SameSite=Strict`; the API chain carries no CSRF tokens.

pub mod api;
pub mod cli;
pub mod security;
pub mod users;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
