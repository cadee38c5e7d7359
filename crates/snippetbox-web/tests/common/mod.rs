//! Shared helpers for end-to-end handler tests.
//!
//! Snippets use the real SQLite model on an in-memory database; users are a
//! mock with one known account so tests avoid argon2 work.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use chrono::{TimeZone, Utc};
use snippetbox_core::{Db, Error, Result, SnippetModel, User, UserStore};
use tower::ServiceExt;
use uuid::Uuid;

use snippetbox_web::session::{DEADLINE_KEY, SqliteSessionStore};
use snippetbox_web::{AppState, Config, router};

pub const KNOWN_NAME: &str = "Nom Falso";
pub const KNOWN_EMAIL: &str = "falso@example.com";
pub const KNOWN_PASSWORD: &str = "pa$$w0rd8923";
pub const DUPE_EMAIL: &str = "dupe@example.com";

const SESSION_COOKIE: &str = "id";

pub fn known_user_id() -> Uuid {
    Uuid::from_u128(0x0192_6d4e_3f1a_7000_8000_0000_0000_0001)
}

/// One account, plus an email that is always taken.
pub struct MockUserStore {
    password: Mutex<String>,
}

impl MockUserStore {
    pub fn new() -> Self {
        Self {
            password: Mutex::new(KNOWN_PASSWORD.to_string()),
        }
    }
}

impl UserStore for MockUserStore {
    fn insert(&self, _name: &str, email: &str, _password: &str) -> Result<Uuid> {
        if email == DUPE_EMAIL || email == KNOWN_EMAIL {
            return Err(Error::DuplicateEmail);
        }
        Ok(Uuid::new_v4())
    }

    fn authenticate(&self, email: &str, password: &str) -> Result<Uuid> {
        if email == KNOWN_EMAIL && *self.password.lock().unwrap() == password {
            Ok(known_user_id())
        } else {
            Err(Error::InvalidCredentials)
        }
    }

    fn exists(&self, id: Uuid) -> Result<bool> {
        Ok(id == known_user_id())
    }

    fn get(&self, id: Uuid) -> Result<User> {
        if id != known_user_id() {
            return Err(Error::NotFound);
        }
        Ok(User {
            id,
            name: KNOWN_NAME.to_string(),
            email: KNOWN_EMAIL.to_string(),
            created_on: Utc.with_ymd_and_hms(2022, 1, 1, 10, 0, 0).unwrap(),
        })
    }

    fn password_update(&self, id: Uuid, current: &str, new: &str) -> Result<()> {
        if id != known_user_id() {
            return Err(Error::NotFound);
        }
        let mut password = self.password.lock().unwrap();
        if *password != current {
            return Err(Error::InvalidCredentials);
        }
        *password = new.to_string();
        Ok(())
    }
}

/// A buffered response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn location(&self) -> Option<&str> {
        self.header(header::LOCATION)
    }
}

/// Drives the full router and carries the session cookie between requests.
pub struct TestClient {
    pub db: Db,
    pub snippets: SnippetModel,
    router: Router,
    cookie: Option<String>,
}

impl TestClient {
    pub fn new() -> Self {
        let db = snippetbox_core::open_in_memory().expect("open in-memory db");

        let config = Config {
            static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("ui/static"),
            secure_cookies: false,
            ..Config::default()
        };

        let snippets = SnippetModel::new(db.clone());
        let state = AppState::with_stores(
            config,
            Arc::new(snippets.clone()),
            Arc::new(MockUserStore::new()),
            SqliteSessionStore::new(db.clone()),
        );

        Self {
            db,
            snippets,
            router: router(state),
            cookie: None,
        }
    }

    /// Current session cookie value, if any.
    pub fn session_cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = self
            .request("GET", path)
            .body(Body::empty())
            .expect("build request");
        self.send(request).await
    }

    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = serde_urlencoded::to_string(fields).expect("encode form");
        let request = self
            .request("POST", path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("build request");
        self.send(request).await
    }

    /// Fetch `path` and pull the CSRF token out of its first form.
    pub async fn csrf_token(&mut self, path: &str) -> String {
        let res = self.get(path).await;
        assert_eq!(res.status, StatusCode::OK, "GET {path}");
        extract_csrf_token(&res.body).expect("page has a csrf token")
    }

    /// Log in as the known user.
    pub async fn login(&mut self) {
        let token = self.csrf_token("/user/login").await;
        let res = self
            .post_form(
                "/user/login",
                &[
                    ("email", KNOWN_EMAIL),
                    ("password", KNOWN_PASSWORD),
                    ("csrf_token", &token),
                ],
            )
            .await;
        assert_eq!(res.status, StatusCode::SEE_OTHER, "login should redirect");
    }

    /// Insert a snippet whose expiry has already passed.
    pub fn insert_expired_snippet(&self) -> Uuid {
        let id = Uuid::now_v7();
        let now = Utc::now().timestamp();
        self.db
            .lock()
            .execute(
                "INSERT INTO snippets (id, title, content, created_on, expires_on)
                 VALUES (?1, 'Expired', 'Long gone', ?2, ?3)",
                rusqlite::params![id.to_string(), now - 7200, now - 60],
            )
            .expect("insert expired snippet");
        id
    }

    pub fn snippet_count(&self) -> i64 {
        self.db
            .lock()
            .query_row("SELECT COUNT(*) FROM snippets", [], |row| row.get(0))
            .expect("count snippets")
    }

    /// Latest expiry among stored sessions.
    pub fn session_expiry(&self) -> Option<i64> {
        self.db
            .lock()
            .query_row("SELECT MAX(expiry) FROM sessions", [], |row| row.get(0))
            .expect("read session expiry")
    }

    /// Move every session's deadline by `secs`.
    pub fn shift_session_deadline(&self, secs: i64) {
        self.db
            .lock()
            .execute(
                &format!(
                    "UPDATE sessions
                     SET expiry = expiry + ?1, data = json_set(data, '$.{DEADLINE_KEY}', expiry + ?1)"
                ),
                [secs],
            )
            .expect("shift session deadline");
    }

    /// Overwrite a string value in every stored session.
    pub fn set_session_value(&self, key: &str, value: &str) {
        self.db
            .lock()
            .execute(
                &format!("UPDATE sessions SET data = json_set(data, '$.{key}', ?1)"),
                [value],
            )
            .expect("set session value");
    }

    fn request(&self, method: &str, path: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, format!("{SESSION_COOKIE}={cookie}"));
        }
        builder
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let res = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        for value in res.headers().get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            let pair = value.split(';').next().unwrap_or_default();
            if let Some(cookie) = pair.strip_prefix(&format!("{SESSION_COOKIE}=")) {
                if value.contains("Max-Age=0") || cookie.is_empty() {
                    self.cookie = None;
                } else {
                    self.cookie = Some(cookie.to_string());
                }
            }
        }

        let status = res.status();
        let headers = res.headers().clone();
        let bytes = to_bytes(res.into_body(), usize::MAX)
            .await
            .expect("read body");

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

/// Value of the first `csrf_token` hidden input in `html`.
pub fn extract_csrf_token(html: &str) -> Option<String> {
    let marker = r#"name="csrf_token" value=""#;
    let start = html.find(marker)? + marker.len();
    let end = html[start..].find('"')? + start;
    Some(html[start..end].to_string())
}
