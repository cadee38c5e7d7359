//! Liveness endpoint.

/// `GET /ping`. Touches neither the session nor the database.
pub(super) async fn ping() -> &'static str {
    "OK"
}
