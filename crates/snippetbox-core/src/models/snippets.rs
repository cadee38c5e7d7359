//! SQLite-backed snippet model.

use chrono::{DateTime, TimeDelta, Utc};
use rusqlite::{OptionalExtension, params};
use serde::Serialize;
use uuid::Uuid;

use super::{SnippetStore, from_timestamp, parse_id};
use crate::error::{Error, Result};
use crate::{Db, LATEST_SNIPPETS_LIMIT};

/// A stored snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snippet {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub created_on: DateTime<Utc>,
    pub expires_on: DateTime<Utc>,
}

type SnippetRow = (String, String, String, i64, i64);

impl Snippet {
    fn from_row((id, title, content, created_on, expires_on): SnippetRow) -> Result<Self> {
        Ok(Self {
            id: parse_id(&id)?,
            title,
            content,
            created_on: from_timestamp("created_on", created_on)?,
            expires_on: from_timestamp("expires_on", expires_on)?,
        })
    }
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SnippetRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

/// Snippet model wrapping the shared database handle.
#[derive(Clone)]
pub struct SnippetModel {
    db: Db,
}

impl SnippetModel {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

impl SnippetStore for SnippetModel {
    fn insert(&self, title: &str, content: &str, expires_days: i64) -> Result<Uuid> {
        let now = Utc::now();
        let expires_on = TimeDelta::try_days(expires_days)
            .and_then(|delta| now.checked_add_signed(delta))
            .ok_or(Error::InvalidExpiry(expires_days))?;

        // v7 ids sort by creation time, so ordering by id is ordering by age.
        let id = Uuid::now_v7();

        let conn = self.db.lock();
        conn.execute(
            "INSERT INTO snippets (id, title, content, created_on, expires_on)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id.to_string(),
                title,
                content,
                now.timestamp(),
                expires_on.timestamp()
            ],
        )?;

        tracing::debug!(snippet_id = %id, expires_days, "snippet inserted");
        Ok(id)
    }

    fn get(&self, id: Uuid) -> Result<Snippet> {
        let row = {
            let conn = self.db.lock();
            conn.query_row(
                "SELECT id, title, content, created_on, expires_on FROM snippets
                 WHERE expires_on > ?1 AND id = ?2",
                params![Utc::now().timestamp(), id.to_string()],
                read_row,
            )
            .optional()?
        };

        match row {
            Some(row) => Snippet::from_row(row),
            None => Err(Error::NotFound),
        }
    }

    fn latest(&self) -> Result<Vec<Snippet>> {
        let rows = {
            let conn = self.db.lock();
            let mut stmt = conn.prepare_cached(
                "SELECT id, title, content, created_on, expires_on FROM snippets
                 WHERE expires_on > ?1 ORDER BY id DESC LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(
                    params![Utc::now().timestamp(), LATEST_SNIPPETS_LIMIT as i64],
                    read_row,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };

        rows.into_iter().map(Snippet::from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::open_in_memory;

    fn model() -> SnippetModel {
        SnippetModel::new(open_in_memory().unwrap())
    }

    /// Write a row whose expiry is already in the past.
    fn insert_expired(model: &SnippetModel, title: &str) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now().timestamp();
        model
            .db
            .lock()
            .execute(
                "INSERT INTO snippets (id, title, content, created_on, expires_on)
                 VALUES (?1, ?2, 'gone', ?3, ?4)",
                params![id.to_string(), title, now - 7200, now - 3600],
            )
            .unwrap();
        id
    }

    #[test]
    fn test_insert_then_get() {
        let m = model();
        let id = m.insert("T", "C", 7).unwrap();

        let snippet = m.get(id).unwrap();
        assert_eq!(snippet.id, id);
        assert_eq!(snippet.title, "T");
        assert_eq!(snippet.content, "C");
        assert_eq!(
            (snippet.expires_on - snippet.created_on).num_days(),
            7,
            "expiry should be created_on + 7 days"
        );
    }

    #[test]
    fn test_get_unknown_id_is_not_found() {
        let m = model();
        assert!(matches!(m.get(Uuid::new_v4()), Err(Error::NotFound)));
    }

    #[test]
    fn test_get_expired_is_not_found() {
        let m = model();
        let id = insert_expired(&m, "old");
        assert!(matches!(m.get(id), Err(Error::NotFound)));
    }

    #[test]
    fn test_latest_skips_expired_and_caps_at_ten() {
        let m = model();
        insert_expired(&m, "old");
        for i in 0..12 {
            m.insert(&format!("snippet {i}"), "body", 1).unwrap();
        }

        let latest = m.latest().unwrap();
        assert_eq!(latest.len(), LATEST_SNIPPETS_LIMIT);
        assert!(latest.iter().all(|s| s.title != "old"));
        assert!(latest.windows(2).all(|w| w[0].id > w[1].id));
    }

    #[test]
    fn test_latest_empty() {
        assert!(model().latest().unwrap().is_empty());
    }

    #[test]
    fn test_insert_rejects_unrepresentable_expiry() {
        let m = model();
        assert!(matches!(
            m.insert("T", "C", i64::MAX),
            Err(Error::InvalidExpiry(_))
        ));
    }
}
