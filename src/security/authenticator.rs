//! Authentication manager: username lookup followed by bcrypt verification.

use anyhow::anyhow;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    credentials::CredentialPair, error::AuthError, password::PasswordEncoder,
    principal::Principal,
};
use crate::users::UserRepository;

// Verified when the username is unknown so both failure paths cost one bcrypt check.
const USER_NOT_FOUND_PASSWORD: &str = "userNotFoundPassword";

pub struct Authenticator {
    users: Arc<dyn UserRepository>,
    encoder: PasswordEncoder,
    user_not_found_hash: String,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("encoder", &self.encoder)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    /// # Errors
    /// Returns an error if the placeholder hash cannot be computed.
    pub fn new(users: Arc<dyn UserRepository>, encoder: PasswordEncoder) -> anyhow::Result<Self> {
        let user_not_found_hash = encoder.encode(USER_NOT_FOUND_PASSWORD)?;
        Ok(Self {
            users,
            encoder,
            user_not_found_hash,
        })
    }

    #[must_use]
    pub fn users(&self) -> &Arc<dyn UserRepository> {
        &self.users
    }

    /// Authenticate a credential pair.
    ///
    /// Unknown users, wrong passwords and missing fields all yield
    /// [`AuthError::BadCredentials`].
    ///
    /// # Errors
    /// Returns [`AuthError::BadCredentials`] when the credentials do not match
    /// a stored user, or [`AuthError::Internal`] when the lookup fails.
    #[instrument(skip_all, fields(username = credentials.username.as_deref().unwrap_or("")))]
    pub async fn authenticate(&self, credentials: CredentialPair) -> Result<Principal, AuthError> {
        let CredentialPair { username, password } = credentials;

        let Some(username) = username.filter(|name| !name.is_empty()) else {
            debug!("Missing username");
            return Err(AuthError::BadCredentials);
        };
        let Some(password) = password else {
            debug!("Missing password");
            return Err(AuthError::BadCredentials);
        };

        let user = self.users.find_by_username(&username).await?;

        let (hash, principal) = match &user {
            Some(user) => (user.password_hash.clone(), Some(Principal::from(user))),
            None => (self.user_not_found_hash.clone(), None),
        };

        let matched = self.verify(password, hash).await?;

        match principal {
            Some(principal) if matched => {
                info!("Authenticated user");
                Ok(principal)
            }
            Some(_) => {
                debug!("Password does not match stored value");
                Err(AuthError::BadCredentials)
            }
            None => {
                debug!("User not found");
                Err(AuthError::BadCredentials)
            }
        }
    }

    async fn verify(&self, password: SecretString, hash: String) -> Result<bool, AuthError> {
        let encoder = self.encoder;
        tokio::task::spawn_blocking(move || encoder.matches(password.expose_secret(), &hash))
            .await
            .map_err(|e| AuthError::Internal(anyhow!("password verification task failed: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::security::password::MIN_COST;
    use crate::users::{InMemoryUserRepository, User};
    use async_trait::async_trait;

    fn authenticator() -> Authenticator {
        let encoder = PasswordEncoder::new(MIN_COST).unwrap();
        let users = InMemoryUserRepository::new()
            .with_user(
                "alice",
                &encoder.encode("secret").unwrap(),
                &["ROLE_USER"],
            )
            .with_user("broken", "not-a-bcrypt-hash", &["ROLE_USER"]);
        Authenticator::new(Arc::new(users), encoder).unwrap()
    }

    #[tokio::test]
    async fn valid_credentials() {
        let principal = authenticator()
            .authenticate(CredentialPair::new("alice", "secret"))
            .await
            .unwrap();
        assert_eq!(principal, Principal::new("alice", ["ROLE_USER"]));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_indistinguishable() {
        let auth = authenticator();
        let wrong = auth
            .authenticate(CredentialPair::new("alice", "wrong"))
            .await;
        let unknown = auth
            .authenticate(CredentialPair::new("mallory", "secret"))
            .await;
        assert!(matches!(wrong, Err(AuthError::BadCredentials)));
        assert!(matches!(unknown, Err(AuthError::BadCredentials)));
    }

    #[tokio::test]
    async fn missing_fields_are_bad_credentials() {
        let auth = authenticator();
        for pair in [
            CredentialPair::default(),
            CredentialPair {
                username: Some("alice".to_string()),
                password: None,
            },
            CredentialPair::new("", "secret"),
        ] {
            assert!(matches!(
                auth.authenticate(pair).await,
                Err(AuthError::BadCredentials)
            ));
        }
    }

    #[tokio::test]
    async fn malformed_stored_hash_never_matches() {
        let result = authenticator()
            .authenticate(CredentialPair::new("broken", "not-a-bcrypt-hash"))
            .await;
        assert!(matches!(result, Err(AuthError::BadCredentials)));
    }

    struct FailingRepository;

    #[async_trait]
    impl UserRepository for FailingRepository {
        async fn find_by_username(&self, _username: &str) -> anyhow::Result<Option<User>> {
            Err(anyhow!("connection refused"))
        }

        async fn ping(&self) -> anyhow::Result<()> {
            Err(anyhow!("connection refused"))
        }
    }

    #[tokio::test]
    async fn repository_failure_is_internal() {
        let auth = Authenticator::new(
            Arc::new(FailingRepository),
            PasswordEncoder::new(MIN_COST).unwrap(),
        )
        .unwrap();
        let result = auth.authenticate(CredentialPair::new("alice", "secret")).await;
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }
}
