//! Authentication error types.

use thiserror::Error;

use larkspur_core::EmailError;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The email address is malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// No account exists for the given email.
    #[error("unknown email")]
    UnknownEmail,

    /// The password does not match the stored hash.
    #[error("wrong password")]
    WrongPassword,

    /// An account with this email already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Database operation failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}
