//! Home and about pages.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use tower_sessions::Session;

use super::template_data;
use crate::context::RequestContext;
use crate::error::AppError;
use crate::state::AppState;

/// `GET /`
pub(super) async fn home(
    State(state): State<AppState>,
    session: Session,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    let snippets = state.snippets.latest()?;

    let mut data = template_data(&session, &ctx).await?;
    data.snippets = snippets;

    state.templates.render(StatusCode::OK, "home.html", &data)
}

/// `GET /about`
pub(super) async fn about(
    State(state): State<AppState>,
    session: Session,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    let data = template_data(&session, &ctx).await?;
    state.templates.render(StatusCode::OK, "about.html", &data)
}
