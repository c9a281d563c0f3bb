//! Security chain, authentication and session handling for the `/api` surface.

pub mod authenticator;
pub mod basic;
pub mod chain;
pub mod credentials;
pub mod error;
pub mod password;
pub mod policy;
pub mod principal;
pub mod session;

pub use self::authenticator::Authenticator;
pub use self::credentials::CredentialPair;
pub use self::error::AuthError;
pub use self::password::PasswordEncoder;
pub use self::policy::{Access, Decision, Policy, Rule};
pub use self::principal::Principal;
pub use self::session::SessionStore;

use std::sync::Arc;

/// Everything the security chain and the login/logout handlers share.
///
/// Built once at start-up and handed to the router.
#[derive(Debug)]
pub struct SecurityState {
    authenticator: Authenticator,
    sessions: Arc<SessionStore>,
    policy: Policy,
    cookie_secure: bool,
}

impl SecurityState {
    #[must_use]
    pub fn new(authenticator: Authenticator, sessions: Arc<SessionStore>, policy: Policy) -> Self {
        Self {
            authenticator,
            sessions,
            policy,
            cookie_secure: false,
        }
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub const fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    #[must_use]
    pub const fn policy(&self) -> &Policy {
        &self.policy
    }

    #[must_use]
    pub const fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }
}
