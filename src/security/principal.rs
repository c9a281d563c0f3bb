//! Authenticated principal attached to requests that passed the security chain.

use std::collections::BTreeSet;

use crate::users::User;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub authorities: BTreeSet<String>,
}

impl Principal {
    #[must_use]
    pub fn new<I, S>(username: impl Into<String>, authorities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            username: username.into(),
            authorities: authorities.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self::new(
            user.username.clone(),
            user.roles.iter().map(|role| role.name.clone()),
        )
    }
}
