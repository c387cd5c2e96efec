//! The module contains the errors the engine can throw.
//!
//! Every store failure surfaces as [`Database`]; the remaining variants are
//! validation or lookup failures raised before anything is written.
//!
//!  [`Database`]: EngineError::Database
use bcrypt::BcryptError;
use sea_orm::DbErr;
use thiserror::Error;
use tokio::task::JoinError;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Category Not Found")]
    CategoryNotFound(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid kind: {0}")]
    InvalidKind(String),
    #[error("Invalid password: {0}")]
    InvalidPassword(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Still in use: {0}")]
    InUse(String),
    #[error(transparent)]
    Password(#[from] BcryptError),
    #[error("password task failed: {0}")]
    PasswordTask(#[from] JoinError),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::CategoryNotFound(a), Self::CategoryNotFound(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidDate(a), Self::InvalidDate(b)) => a == b,
            (Self::InvalidKind(a), Self::InvalidKind(b)) => a == b,
            (Self::InvalidPassword(a), Self::InvalidPassword(b)) => a == b,
            (Self::InvalidCredentials, Self::InvalidCredentials) => true,
            (Self::InUse(a), Self::InUse(b)) => a == b,
            (Self::Password(a), Self::Password(b)) => a.to_string() == b.to_string(),
            (Self::PasswordTask(a), Self::PasswordTask(b)) => a.to_string() == b.to_string(),
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
