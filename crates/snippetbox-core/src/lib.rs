//! Core types, storage and validation for Snippetbox.
//!
//! This crate provides:
//! - SQLite schema creation and versioning
//! - Snippet and user models behind the [`SnippetStore`] / [`UserStore`] traits
//! - Argon2 password hashing
//! - A field-level form [`Validator`]
//! - Shared error types

mod error;
pub mod models;
pub mod password;
pub mod schema;
pub mod validator;

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::Connection;

// ═══════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════

/// Number of snippets returned by [`SnippetStore::latest`].
pub const LATEST_SNIPPETS_LIMIT: usize = 10;

/// Expiry values (in days) a snippet may be created with.
pub const PERMITTED_EXPIRY_DAYS: [i64; 3] = [1, 7, 365];

pub use error::{Error, Result};
pub use models::{Snippet, SnippetModel, SnippetStore, User, UserModel, UserStore};
pub use validator::Validator;

/// Shared handle to the application database.
///
/// SQLite connections are not `Sync`, so the connection sits behind a mutex.
/// Callers must never hold the guard across an `.await`.
pub type Db = Arc<Mutex<Connection>>;

/// Open (or create) the database at `path` and bring the schema up to date.
pub fn open_db(path: impl AsRef<Path>) -> Result<Db> {
    let conn = Connection::open(path.as_ref())?;
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    schema::init_schema(&conn)?;

    tracing::info!(path = %path.as_ref().display(), "database opened");

    Ok(Arc::new(Mutex::new(conn)))
}

/// Open a fresh in-memory database with the schema applied.
pub fn open_in_memory() -> Result<Db> {
    let conn = Connection::open_in_memory()?;
    schema::init_schema(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}
