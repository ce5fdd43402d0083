//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`Forbidden`] thrown when the caller lacks the access or role required.
//! - [`KeyNotFound`] thrown when an item is not found, or does not belong to
//!   the stated trip.
//! - [`ExistingKey`] thrown on duplicates and on deleting referenced items.
//! - [`InvalidInput`] thrown when the input shape or range is wrong.
//! - [`InvariantViolation`] thrown when an operation would leave a trip
//!   without an accepted organizer.
//!
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`InvariantViolation`]: EngineError::InvariantViolation
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::InvariantViolation(a), Self::InvariantViolation(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
