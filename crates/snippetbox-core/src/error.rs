//! Error types for the model layer.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the snippet and user models.
#[derive(Error, Debug)]
pub enum Error {
    /// No matching (unexpired) record exists.
    #[error("models: no matching record found")]
    NotFound,

    /// The email address is already taken by another user.
    #[error("models: duplicate email")]
    DuplicateEmail,

    /// Unknown email, or password does not match the stored hash.
    #[error("models: invalid credentials")]
    InvalidCredentials,

    /// Expiry period cannot be represented as a timestamp.
    #[error("models: invalid expiry of {0} days")]
    InvalidExpiry(i64),

    /// SQLite error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Password hashing or hash parsing failed.
    #[error("password hash error: {0}")]
    PasswordHash(String),

    /// A stored value could not be decoded.
    #[error("corrupt value in column '{field}': {reason}")]
    Corrupt {
        /// The column holding the bad value.
        field: &'static str,
        /// Description of what's wrong.
        reason: String,
    },
}

impl From<argon2::password_hash::Error> for Error {
    fn from(err: argon2::password_hash::Error) -> Self {
        Self::PasswordHash(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_display() {
        assert_eq!(Error::NotFound.to_string(), "models: no matching record found");
        assert_eq!(Error::DuplicateEmail.to_string(), "models: duplicate email");
        assert_eq!(
            Error::InvalidCredentials.to_string(),
            "models: invalid credentials"
        );
    }

    #[test]
    fn test_corrupt_display() {
        let err = Error::Corrupt {
            field: "id",
            reason: "invalid length".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'id'"));
        assert!(msg.contains("invalid length"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let err: Error = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, Error::Database(_)));
        assert!(err.to_string().contains("database error"));
    }

    #[test]
    fn test_from_password_hash_error() {
        let err: Error = argon2::password_hash::Error::Password.into();
        assert!(matches!(err, Error::PasswordHash(_)));
    }
}
