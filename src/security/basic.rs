//! HTTP Basic credentials from the `Authorization` header.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use base64ct::{Base64, Encoding};

use super::{credentials::CredentialPair, error::AuthError};

/// Parse Basic credentials.
///
/// Returns `None` when the request carries no Basic authorization, and
/// `Some(Err(..))` when it does but the token cannot be decoded.
#[must_use]
pub fn parse(headers: &HeaderMap) -> Option<Result<CredentialPair, AuthError>> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    Some(decode(token.trim()))
}

fn decode(token: &str) -> Result<CredentialPair, AuthError> {
    let bytes = Base64::decode_vec(token).map_err(|_| AuthError::BadCredentials)?;
    let text = String::from_utf8(bytes).map_err(|_| AuthError::BadCredentials)?;
    let (username, password) = text.split_once(':').ok_or(AuthError::BadCredentials)?;
    Ok(CredentialPair::new(username, password))
}
