//! SQLite schema for snippets, users and sessions.
//!
//! All timestamps are stored as Unix seconds (UTC). Identifiers are
//! hyphenated lowercase UUID strings.

use rusqlite::{Connection, Result};

/// Current schema version. Increment when making breaking changes.
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema.
///
/// Creates all tables if they don't exist and records the schema version.
pub fn init_schema(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;

    if current_version < SCHEMA_VERSION {
        create_tables(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
        tracing::debug!(
            from = current_version,
            to = SCHEMA_VERSION,
            "schema initialized"
        );
    }

    Ok(())
}

/// Get the current schema version (0 if not initialized).
fn get_schema_version(conn: &Connection) -> Result<i32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL
        )",
        [],
    )?;

    let version: Option<i32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .ok();

    Ok(version.unwrap_or(0))
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?)", [version])?;
    Ok(())
}

fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS snippets (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            created_on INTEGER NOT NULL,
            expires_on INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_snippets_expires_on ON snippets(expires_on);

        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            hashed_password TEXT NOT NULL,
            created_on INTEGER NOT NULL,
            CONSTRAINT users_uc_email UNIQUE (email)
        );

        -- Server-side session records (tower-sessions)
        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            data TEXT NOT NULL,
            expiry INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_expiry ON sessions(expiry);
        "#,
    )
}
