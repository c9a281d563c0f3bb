//! Credential extraction for `POST /api/login`.
//!
//! JSON bodies are read as a flat object with `username` and `password` keys.
//! Anything else falls back to form fields taken from the query string and an
//! `application/x-www-form-urlencoded` body.

use axum::http::{header::CONTENT_TYPE, HeaderMap};
use secrecy::SecretString;
use serde_json::{Map, Value};

use super::error::AuthError;

pub const USERNAME_FIELD: &str = "username";
pub const PASSWORD_FIELD: &str = "password";

const JSON_MEDIA_TYPE: &str = "application/json";
const FORM_MEDIA_TYPE: &str = "application/x-www-form-urlencoded";

/// Username and password as presented by the client.
///
/// `None` means the field was absent; the authenticator rejects it as bad
/// credentials rather than as a parse error.
#[derive(Default)]
pub struct CredentialPair {
    pub username: Option<String>,
    pub password: Option<SecretString>,
}

impl CredentialPair {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(SecretString::from(password.into())),
        }
    }
}

impl std::fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPair")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Build a credential pair from a login request.
///
/// # Errors
/// Returns [`AuthError::MalformedBody`] when a JSON body cannot be read as a
/// flat object.
pub fn extract(
    headers: &HeaderMap,
    query: Option<&str>,
    body: &[u8],
) -> Result<CredentialPair, AuthError> {
    if has_media_type(headers, JSON_MEDIA_TYPE) {
        from_json(body)
    } else {
        let body = if has_media_type(headers, FORM_MEDIA_TYPE) {
            body
        } else {
            &[][..]
        };
        Ok(from_form(query.unwrap_or_default().as_bytes(), body))
    }
}

fn has_media_type(headers: &HeaderMap, media_type: &str) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.to_ascii_lowercase().contains(media_type))
}

fn from_json(body: &[u8]) -> Result<CredentialPair, AuthError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| AuthError::MalformedBody(e.to_string()))?;

    let Value::Object(map) = value else {
        return Err(AuthError::MalformedBody(
            "expected a JSON object".to_string(),
        ));
    };

    let flat = flatten(map)?;
    let username = flat.get(USERNAME_FIELD).cloned().flatten();
    let password = flat
        .get(PASSWORD_FIELD)
        .cloned()
        .flatten()
        .map(SecretString::from);

    Ok(CredentialPair { username, password })
}

// Every value must be a scalar; numbers and booleans are kept as their text form.
fn flatten(
    map: Map<String, Value>,
) -> Result<std::collections::HashMap<String, Option<String>>, AuthError> {
    map.into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::Null => None,
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                Value::Array(_) | Value::Object(_) => {
                    return Err(AuthError::MalformedBody(format!(
                        "field `{key}` is not a string"
                    )));
                }
            };
            Ok((key, text))
        })
        .collect()
}

fn from_form(query: &[u8], body: &[u8]) -> CredentialPair {
    let field = |name: &str| -> Option<String> {
        url::form_urlencoded::parse(query)
            .chain(url::form_urlencoded::parse(body))
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    };

    let username = field(USERNAME_FIELD).unwrap_or_default().trim().to_string();
    let password = field(PASSWORD_FIELD).unwrap_or_default();

    CredentialPair {
        username: Some(username),
        password: Some(SecretString::from(password)),
    }
}
