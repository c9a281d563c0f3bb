//! bcrypt password hashing and verification.

use anyhow::{anyhow, Result};
use tracing::warn;

pub const DEFAULT_COST: u32 = 10;
pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;

#[derive(Clone, Copy, Debug)]
pub struct PasswordEncoder {
    cost: u32,
}

impl Default for PasswordEncoder {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordEncoder {
    /// # Errors
    /// Returns an error if the cost is outside the range bcrypt accepts.
    pub fn new(cost: u32) -> Result<Self> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(anyhow!(
                "bcrypt cost must be between {MIN_COST} and {MAX_COST}, got {cost}"
            ));
        }
        Ok(Self { cost })
    }

    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a raw password with a fresh salt.
    ///
    /// # Errors
    /// Returns an error if bcrypt fails to hash the input.
    pub fn encode(&self, raw: &str) -> Result<String> {
        bcrypt::hash(raw, self.cost).map_err(|e| anyhow!("failed to hash password: {e}"))
    }

    /// Check a raw password against a stored hash.
    ///
    /// A stored value that is empty or not a bcrypt hash never matches.
    #[must_use]
    pub fn matches(&self, raw: &str, encoded: &str) -> bool {
        if encoded.is_empty() {
            warn!("Empty encoded password");
            return false;
        }
        match bcrypt::verify(raw, encoded) {
            Ok(matched) => matched,
            Err(e) => {
                warn!("Encoded password does not look like bcrypt: {e}");
                false
            }
        }
    }
}
