//! Snippet and user models.
//!
//! The web layer talks to storage through [`SnippetStore`] and [`UserStore`]
//! so handlers can be exercised against in-memory test doubles. The SQLite
//! implementations are [`SnippetModel`] and [`UserModel`].

mod snippets;
mod users;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{Error, Result};

pub use snippets::{Snippet, SnippetModel};
pub use users::{User, UserModel};

/// Snippet persistence.
pub trait SnippetStore: Send + Sync {
    /// Store a new snippet expiring `expires_days` from now. Returns its id.
    fn insert(&self, title: &str, content: &str, expires_days: i64) -> Result<Uuid>;

    /// Fetch an unexpired snippet. [`Error::NotFound`] otherwise.
    fn get(&self, id: Uuid) -> Result<Snippet>;

    /// Up to [`crate::LATEST_SNIPPETS_LIMIT`] unexpired snippets, newest first.
    fn latest(&self) -> Result<Vec<Snippet>>;
}

/// User account persistence.
pub trait UserStore: Send + Sync {
    /// Create an account. [`Error::DuplicateEmail`] if the email is taken.
    fn insert(&self, name: &str, email: &str, password: &str) -> Result<Uuid>;

    /// Check credentials and return the user's id.
    /// [`Error::InvalidCredentials`] on unknown email or wrong password.
    fn authenticate(&self, email: &str, password: &str) -> Result<Uuid>;

    fn exists(&self, id: Uuid) -> Result<bool>;

    /// [`Error::NotFound`] if there is no such user.
    fn get(&self, id: Uuid) -> Result<User>;

    /// Replace the password after verifying the current one.
    /// [`Error::InvalidCredentials`] if `current` is wrong.
    fn password_update(&self, id: Uuid, current: &str, new: &str) -> Result<()>;
}

fn parse_id(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| Error::Corrupt {
        field: "id",
        reason: e.to_string(),
    })
}

fn from_timestamp(field: &'static str, secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| Error::Corrupt {
        field,
        reason: format!("timestamp {secs} out of range"),
    })
}
