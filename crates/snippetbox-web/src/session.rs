//! Session storage and session-key constants.
//!
//! Sessions live in the application's own SQLite database. Each row holds the
//! session data as a JSON object plus its expiry as a Unix timestamp.
//!
//! A session's expiry is fixed when it is first stored. Later writes and id
//! renewals carry that deadline forward rather than extending it.

use std::collections::HashMap;

use async_trait::async_trait;
use rusqlite::{OptionalExtension, params};
use snippetbox_core::Db;
use time::OffsetDateTime;
use tower_sessions::cookie::SameSite;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};
use tower_sessions::{Expiry, SessionManagerLayer};

use crate::config::{Config, SESSION_LIFETIME};

/// Session key holding the logged-in user's id.
pub const AUTHENTICATED_USER_ID_KEY: &str = "authenticated_user_id";

/// Session key holding the one-shot flash message.
pub const FLASH_KEY: &str = "flash";

/// Session key holding the per-session CSRF token.
pub const CSRF_TOKEN_KEY: &str = "csrf_token";

/// Session key holding the Unix timestamp the session dies at.
pub const DEADLINE_KEY: &str = "deadline";

/// [`SessionStore`] backed by the `sessions` table.
#[derive(Debug, Clone)]
pub struct SqliteSessionStore {
    db: Db,
}

impl SqliteSessionStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Remove every session whose expiry has passed. Returns the number removed.
    pub fn delete_expired(&self) -> Result<usize, rusqlite::Error> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let conn = self.db.lock();
        conn.execute("DELETE FROM sessions WHERE expiry <= ?1", [now])
    }
}

fn backend(err: rusqlite::Error) -> session_store::Error {
    session_store::Error::Backend(err.to_string())
}

/// The deadline stored in the session data, or the record's own expiry.
fn deadline(record: &Record) -> i64 {
    record
        .data
        .get(DEADLINE_KEY)
        .and_then(serde_json::Value::as_i64)
        .unwrap_or_else(|| record.expiry_date.unix_timestamp())
}

fn encode(record: &Record) -> session_store::Result<String> {
    serde_json::to_string(&record.data).map_err(|e| session_store::Error::Encode(e.to_string()))
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        // A renewed id keeps the deadline of the session it replaces.
        let expiry = deadline(record);
        record
            .data
            .insert(DEADLINE_KEY.to_string(), serde_json::Value::from(expiry));
        record.expiry_date = OffsetDateTime::from_unix_timestamp(expiry)
            .map_err(|e| session_store::Error::Encode(e.to_string()))?;
        let data = encode(record)?;

        let conn = self.db.lock();
        loop {
            let inserted = conn
                .execute(
                    "INSERT OR IGNORE INTO sessions (id, data, expiry) VALUES (?1, ?2, ?3)",
                    params![record.id.to_string(), data, expiry],
                )
                .map_err(backend)?;

            if inserted == 1 {
                return Ok(());
            }

            // Id collision; draw a new one.
            record.id = Id::default();
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let data = encode(record)?;

        let conn = self.db.lock();
        conn.execute(
            "INSERT INTO sessions (id, data, expiry) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE
             SET data = excluded.data, expiry = MIN(sessions.expiry, excluded.expiry)",
            params![record.id.to_string(), data, deadline(record)],
        )
        .map_err(backend)?;

        Ok(())
    }

    async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
        let row: Option<(String, i64)> = {
            let conn = self.db.lock();
            conn.query_row(
                "SELECT data, expiry FROM sessions WHERE id = ?1 AND expiry > ?2",
                params![id.to_string(), OffsetDateTime::now_utc().unix_timestamp()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(backend)?
        };

        let Some((data, expiry)) = row else {
            return Ok(None);
        };

        let data: HashMap<String, serde_json::Value> = serde_json::from_str(&data)
            .map_err(|e| session_store::Error::Decode(e.to_string()))?;
        let expiry_date = OffsetDateTime::from_unix_timestamp(expiry)
            .map_err(|e| session_store::Error::Decode(e.to_string()))?;

        Ok(Some(Record {
            id: *id,
            data,
            expiry_date,
        }))
    }

    async fn delete(&self, id: &Id) -> session_store::Result<()> {
        let conn = self.db.lock();
        conn.execute("DELETE FROM sessions WHERE id = ?1", [id.to_string()])
            .map_err(backend)?;
        Ok(())
    }
}

/// Session layer: HttpOnly cookie, SameSite=Lax.
///
/// The cookie's max-age is refreshed on every write; the server-side row
/// still dies 12 hours after the session was created.
pub fn session_layer(
    store: SqliteSessionStore,
    config: &Config,
) -> SessionManagerLayer<SqliteSessionStore> {
    let lifetime = time::Duration::seconds(SESSION_LIFETIME.as_secs() as i64);

    SessionManagerLayer::new(store)
        .with_secure(config.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(lifetime))
}
