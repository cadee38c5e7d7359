//! Snippet view and creation.

use axum::Form;
use axum::extract::rejection::FormRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use tower_sessions::Session;
use uuid::Uuid;

use super::template_data;
use crate::context::RequestContext;
use crate::error::AppError;
use crate::forms::SnippetCreateForm;
use crate::session::FLASH_KEY;
use crate::state::AppState;
use crate::templates::FormData;

/// `GET /snippet/view/{id}`. Unknown, expired and malformed ids are all 404.
pub(super) async fn snippet_view(
    State(state): State<AppState>,
    session: Session,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = Uuid::parse_str(&id).map_err(|_| AppError::NotFound)?;
    let snippet = state.snippets.get(id)?;

    let mut data = template_data(&session, &ctx).await?;
    data.snippet = Some(snippet);

    state.templates.render(StatusCode::OK, "view.html", &data)
}

/// `GET /snippet/create`
pub(super) async fn snippet_create(
    State(state): State<AppState>,
    session: Session,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    let data = template_data(&session, &ctx)
        .await?
        .with_form(FormData::SnippetCreate(SnippetCreateForm::default()));

    state.templates.render(StatusCode::OK, "create.html", &data)
}

/// `POST /snippet/create`
pub(super) async fn snippet_create_post(
    State(state): State<AppState>,
    session: Session,
    ctx: RequestContext,
    form: Result<Form<SnippetCreateForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(mut form) = form?;

    if !form.validate() {
        let data = template_data(&session, &ctx)
            .await?
            .with_form(FormData::SnippetCreate(form));
        return state
            .templates
            .render(StatusCode::UNPROCESSABLE_ENTITY, "create.html", &data);
    }

    let id = state
        .snippets
        .insert(&form.title, &form.content, form.expires)?;

    tracing::info!(snippet_id = %id, "snippet created");

    session
        .insert(FLASH_KEY, "Snippet successfully created!")
        .await?;

    Ok(Redirect::to(&format!("/snippet/view/{id}")).into_response())
}
