//! Session-based authentication.

use axum::extract::{Request, State};
use axum::http::{HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tower_sessions::Session;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::AppError;
use crate::session::AUTHENTICATED_USER_ID_KEY;
use crate::state::AppState;

/// Where anonymous requests to protected routes are sent.
pub const LOGIN_PATH: &str = "/user/login";

/// Record in the request context whether the session belongs to a live user.
///
/// A user id left in the session after the account disappeared is ignored.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session = request
        .extensions()
        .get::<Session>()
        .cloned()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("session layer missing")))?;

    let mut ctx = request
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_default();

    if let Some(id) = session.get::<Uuid>(AUTHENTICATED_USER_ID_KEY).await? {
        if state.users.exists(id)? {
            ctx.authenticated_user_id = Some(id);
        } else {
            tracing::debug!(user_id = %id, "session names a user that no longer exists");
        }
    }

    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

/// Redirect anonymous requests to the login page without running the handler.
///
/// Authenticated responses are marked `Cache-Control: no-store`.
pub async fn require_authentication(
    ctx: RequestContext,
    request: Request,
    next: Next,
) -> Response {
    if !ctx.is_authenticated() {
        tracing::debug!(path = %request.uri().path(), "redirecting anonymous request to login");
        return Redirect::to(LOGIN_PATH).into_response();
    }

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
