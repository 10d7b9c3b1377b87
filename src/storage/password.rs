//! Password hashing
//!
//! Stores keep the hash as an opaque string; only a [`PasswordHasher`] reads it.

use crate::error::{Error, Result};

pub trait PasswordHasher {
    /// Returns a salted hash of `password`
    fn hash(&self, password: &str) -> Result<String>;

    /// Returns true if `password` produced `hash`
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// bcrypt with a configurable cost
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bcrypt {
    pub cost: u32,
}

impl Bcrypt {
    pub fn new(cost: u32) -> Result<Self> {
        if !(4..=31).contains(&cost) {
            return Err(Error::bad_request(format!(
                "bcrypt cost must be between 4 and 31, got {}",
                cost
            )));
        }
        Ok(Self { cost })
    }
}

impl Default for Bcrypt {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl PasswordHasher for Bcrypt {
    fn hash(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.cost).map_err(|e| Error::internal(format!("hash password: {}", e)))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        // A malformed stored hash never matches.
        bcrypt::verify(password, hash).unwrap_or(false)
    }
}
