use sqlx::FromRow;
use thiserror::Error;

use super::password::HashError;

/// Row of the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub email_addr: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String, // argon2 PHC string, never serialized
}

/// Validated input for a new row. `password` is plaintext and is hashed by the repository.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email_addr: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("email address already registered")]
    UniqueViolation,

    #[error(transparent)]
    Hash(#[from] HashError),

    #[error("database error: {0}")]
    Storage(#[source] sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match err.as_database_error() {
            Some(db) if db.is_unique_violation() => RepoError::UniqueViolation,
            _ => RepoError::Storage(err),
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;
