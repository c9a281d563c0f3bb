use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

use super::{Role, User, UserRepository};

/// Fixed set of users held in memory. Used by tests and local runs.
#[derive(Clone, Debug, Default)]
pub struct InMemoryUserRepository {
    users: HashMap<String, User>,
}

impl InMemoryUserRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user with an already hashed password.
    #[must_use]
    pub fn with_user(mut self, username: &str, password_hash: &str, roles: &[&str]) -> Self {
        let id = i64::try_from(self.users.len()).unwrap_or(i64::MAX - 1) + 1;
        self.users.insert(
            username.to_string(),
            User {
                id,
                username: username.to_string(),
                password_hash: password_hash.to_string(),
                roles: roles.iter().map(|name| Role::new(*name)).collect(),
            },
        );
        self
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.users.get(username).cloned())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
