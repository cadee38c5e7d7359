//! SQLite-backed user model.

use chrono::{DateTime, Utc};
use rusqlite::{ErrorCode, OptionalExtension, params};
use serde::Serialize;
use uuid::Uuid;

use super::{UserStore, from_timestamp, parse_id};
use crate::error::{Error, Result};
use crate::{Db, password};

/// A user account. The password hash never leaves the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_on: DateTime<Utc>,
}

/// User model wrapping the shared database handle.
#[derive(Clone)]
pub struct UserModel {
    db: Db,
}

impl UserModel {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    fn hashed_password_by_id(&self, id: Uuid) -> Result<Option<String>> {
        let conn = self.db.lock();
        let hash = conn
            .query_row(
                "SELECT hashed_password FROM users WHERE id = ?1",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(hash)
    }
}

/// True if `err` is the unique constraint on `users.email`.
fn is_duplicate_email(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, Some(message)) => {
            code.code == ErrorCode::ConstraintViolation && message.contains("users.email")
        }
        _ => false,
    }
}

impl UserStore for UserModel {
    fn insert(&self, name: &str, email: &str, password: &str) -> Result<Uuid> {
        // Hash before taking the lock.
        let hashed = password::hash(password)?;
        let id = Uuid::new_v4();

        let conn = self.db.lock();
        let inserted = conn.execute(
            "INSERT INTO users (id, name, email, hashed_password, created_on)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id.to_string(), name, email, hashed, Utc::now().timestamp()],
        );

        match inserted {
            Ok(_) => {
                tracing::debug!(user_id = %id, "user inserted");
                Ok(id)
            }
            Err(err) if is_duplicate_email(&err) => Err(Error::DuplicateEmail),
            Err(err) => Err(err.into()),
        }
    }

    fn authenticate(&self, email: &str, password: &str) -> Result<Uuid> {
        let row: Option<(String, String)> = {
            let conn = self.db.lock();
            conn.query_row(
                "SELECT id, hashed_password FROM users WHERE email = ?1",
                [email],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?
        };

        let Some((id, hashed)) = row else {
            return Err(Error::InvalidCredentials);
        };

        if !password::verify(password, &hashed)? {
            return Err(Error::InvalidCredentials);
        }

        parse_id(&id)
    }

    fn exists(&self, id: Uuid) -> Result<bool> {
        let conn = self.db.lock();
        let exists = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn get(&self, id: Uuid) -> Result<User> {
        let row: Option<(String, String, String, i64)> = {
            let conn = self.db.lock();
            conn.query_row(
                "SELECT id, name, email, created_on FROM users WHERE id = ?1",
                [id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?
        };

        let (id, name, email, created_on) = row.ok_or(Error::NotFound)?;
        Ok(User {
            id: parse_id(&id)?,
            name,
            email,
            created_on: from_timestamp("created_on", created_on)?,
        })
    }

    fn password_update(&self, id: Uuid, current: &str, new: &str) -> Result<()> {
        let hashed = self.hashed_password_by_id(id)?.ok_or(Error::NotFound)?;

        if !password::verify(current, &hashed)? {
            return Err(Error::InvalidCredentials);
        }

        let new_hash = password::hash(new)?;
        let conn = self.db.lock();
        let updated = conn.execute(
            "UPDATE users SET hashed_password = ?1 WHERE id = ?2",
            params![new_hash, id.to_string()],
        )?;

        if updated == 0 {
            return Err(Error::NotFound);
        }

        tracing::debug!(user_id = %id, "password updated");
        Ok(())
    }
}
