//! User records and the lookup-by-username contract.
//!
//! Users are owned by the persistence layer; this crate only reads them.

mod memory;
mod postgres;

pub use self::memory::InMemoryUserRepository;
pub use self::postgres::PgUserRepository;

use anyhow::Result;
use async_trait::async_trait;

/// A role assigned to a user. The name is used verbatim as a granted authority.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Role {
    pub name: String,
}

impl Role {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub roles: Vec<Role>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"***")
            .field("roles", &self.roles)
            .finish()
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up a user by exact username.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be queried.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Check that the backing store is reachable.
    ///
    /// # Errors
    /// Returns an error if the backing store does not answer.
    async fn ping(&self) -> Result<()>;
}
