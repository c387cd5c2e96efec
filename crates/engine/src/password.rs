//! Password hashing for user accounts.

use bcrypt::{hash, verify};

use crate::{EngineError, ResultEngine};

const MIN_PASSWORD_CHARS: usize = 8;

/// A bcrypt hash of a validated password.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PasswordHash(String);

impl PasswordHash {
    /// Validate and hash `raw_password` with the given bcrypt cost.
    pub(crate) fn new(raw_password: &str, cost: u32) -> ResultEngine<Self> {
        if raw_password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(EngineError::InvalidPassword(format!(
                "password must be at least {MIN_PASSWORD_CHARS} characters"
            )));
        }
        Ok(Self(hash(raw_password, cost)?))
    }

    /// Like [`PasswordHash::new`], but hashes on the blocking pool so the
    /// async workers stay free.
    pub(crate) async fn new_blocking(raw_password: &str, cost: u32) -> ResultEngine<Self> {
        let raw_password = raw_password.to_owned();
        tokio::task::spawn_blocking(move || Self::new(&raw_password, cost)).await?
    }

    /// Wrap a hash loaded from the database.
    pub(crate) fn from_stored(stored: String) -> Self {
        Self(stored)
    }

    /// Check that `raw_password` matches the stored hash.
    pub(crate) fn verify(&self, raw_password: &str) -> ResultEngine<bool> {
        Ok(verify(raw_password, &self.0)?)
    }

    /// [`PasswordHash::verify`] on the blocking pool.
    pub(crate) async fn verify_blocking(self, raw_password: &str) -> ResultEngine<bool> {
        let raw_password = raw_password.to_owned();
        tokio::task::spawn_blocking(move || self.verify(&raw_password)).await?
    }

    pub(crate) fn into_string(self) -> String {
        self.0
    }
}
