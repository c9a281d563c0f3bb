//! In-process session store and the session cookie.
//!
//! Sessions expire after a period of inactivity. Tokens are random 32-byte
//! values encoded as URL-safe base64 and only travel in the cookie.

use anyhow::{anyhow, Context, Result};
use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::{sync::RwLock, task::JoinHandle};
use tracing::debug;

use super::principal::Principal;

pub const SESSION_COOKIE_NAME: &str = "caslogin_session";
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 30 * 60;

const TOKEN_BYTES: usize = 32;
const CREATE_ATTEMPTS: usize = 3;

#[derive(Clone, Debug)]
struct Session {
    principal: Principal,
    created_at: Instant,
    last_accessed: Instant,
}

impl Session {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.duration_since(self.last_accessed) >= ttl
    }
}

#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_SESSION_TTL_SECONDS))
    }
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Store a new session for the principal and return its token.
    ///
    /// # Errors
    /// Returns an error if the system RNG fails.
    pub async fn create(&self, principal: Principal) -> Result<String> {
        let mut sessions = self.sessions.write().await;
        for _ in 0..CREATE_ATTEMPTS {
            let token = generate_session_token()?;
            if sessions.contains_key(&token) {
                continue;
            }
            let now = Instant::now();
            debug!(username = %principal.username, "session created");
            sessions.insert(
                token.clone(),
                Session {
                    principal,
                    created_at: now,
                    last_accessed: now,
                },
            );
            return Ok(token);
        }
        Err(anyhow!("failed to generate unique session token"))
    }

    /// Resolve a token to its principal and mark the session as used.
    pub async fn get(&self, token: &str) -> Option<Principal> {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        let session = sessions.get_mut(token)?;
        if session.is_expired(now, self.ttl) {
            debug!(
                username = %session.principal.username,
                age_seconds = now.duration_since(session.created_at).as_secs(),
                "session expired"
            );
            sessions.remove(token);
            return None;
        }
        session.last_accessed = now;
        Some(session.principal.clone())
    }

    /// Remove a session. Returns `true` if it existed.
    pub async fn invalidate(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    /// Drop every expired session and return how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now, self.ttl));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Periodically purge expired sessions until the task is aborted.
pub fn spawn_purge_task(store: Arc<SessionStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let purged = store.purge_expired().await;
            if purged > 0 {
                debug!(purged, "purged expired sessions");
            }
        }
    })
}

/// Create a new random session token.
///
/// # Errors
/// Returns an error if the system RNG fails.
pub fn generate_session_token() -> Result<String> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

/// Build the `HttpOnly` session cookie.
///
/// # Errors
/// Returns an error if the token contains bytes not allowed in a header.
pub fn session_cookie(
    token: &str,
    ttl: Duration,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        ttl.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Build a cookie that makes the client drop the session cookie.
///
/// # Errors
/// Returns an error if the cookie is not a valid header value.
pub fn clear_session_cookie(secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie =
        format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Read the session token from the request cookies, if present.
#[must_use]
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    cookie_pairs(headers)
        .find(|(key, _)| key == SESSION_COOKIE_NAME)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// Names of every cookie carried by the request.
#[must_use]
pub fn cookie_names(headers: &HeaderMap) -> Vec<String> {
    cookie_pairs(headers).map(|(key, _)| key).collect()
}

fn cookie_pairs(headers: &HeaderMap) -> impl Iterator<Item = (String, String)> + '_ {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            let key = parts.next()?.trim();
            let value = parts.next()?.trim();
            if key.is_empty() {
                None
            } else {
                Some((key.to_string(), value.to_string()))
            }
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn alice() -> Principal {
        Principal::new("alice", ["ROLE_USER"])
    }

    #[tokio::test]
    async fn create_get_invalidate() {
        let store = SessionStore::default();
        let token = store.create(alice()).await.unwrap();

        assert_eq!(store.get(&token).await, Some(alice()));
        assert_eq!(store.len().await, 1);

        assert!(store.invalidate(&token).await);
        assert!(!store.invalidate(&token).await);
        assert_eq!(store.get(&token).await, None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn tokens_are_unique() {
        let store = SessionStore::default();
        let first = store.create(alice()).await.unwrap();
        let second = store.create(alice()).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn expired_sessions_are_not_resolved() {
        let store = SessionStore::new(Duration::from_millis(10));
        let token = store.create(alice()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(store.get(&token).await, None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn purge_removes_only_expired() {
        let store = SessionStore::new(Duration::from_millis(50));
        let old = store.create(alice()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;
        let fresh = store.create(alice()).await.unwrap();

        assert_eq!(store.purge_expired().await, 1);
        assert_eq!(store.get(&old).await, None);
        assert_eq!(store.get(&fresh).await, Some(alice()));
    }

    #[tokio::test]
    async fn purge_task_empties_the_store() {
        let store = Arc::new(SessionStore::new(Duration::from_millis(10)));
        store.create(alice()).await.unwrap();
        store.create(alice()).await.unwrap();

        let handle = spawn_purge_task(store.clone(), Duration::from_millis(5));
        for _ in 0..100 {
            if store.is_empty().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert!(store.is_empty().await);
    }

    #[test]
    fn generated_token_is_url_safe() {
        let token = generate_session_token().unwrap();
        assert_eq!(token.len(), 43);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn cookie_attributes() {
        let cookie = session_cookie("abc", Duration::from_secs(1800), false).unwrap();
        assert_eq!(
            cookie.to_str().unwrap(),
            "caslogin_session=abc; Path=/; HttpOnly; SameSite=Strict; Max-Age=1800"
        );
        let secure = session_cookie("abc", Duration::from_secs(60), true).unwrap();
        assert!(secure.to_str().unwrap().ends_with("; Secure"));

        let cleared = clear_session_cookie(false).unwrap();
        assert!(cleared.to_str().unwrap().contains("Max-Age=0"));
    }

    #[test]
    fn extracts_token_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(
            COOKIE,
            HeaderValue::from_static("lang=es; caslogin_session=tok123 ; other=1"),
        );
        assert_eq!(extract_session_token(&headers), Some("tok123".to_string()));
        assert_eq!(
            cookie_names(&headers),
            vec!["theme", "lang", "caslogin_session", "other"]
        );
    }

    #[test]
    fn empty_or_missing_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_session_token(&headers), None);
        headers.insert(COOKIE, HeaderValue::from_static("caslogin_session="));
        assert_eq!(extract_session_token(&headers), None);
    }
}
