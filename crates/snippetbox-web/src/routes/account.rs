//! Account page and password change.

use axum::Form;
use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use snippetbox_core::Error as ModelError;
use tower_sessions::Session;

use super::template_data;
use crate::context::RequestContext;
use crate::error::AppError;
use crate::forms::{BAD_CURRENT_PASSWORD, PasswordUpdateForm};
use crate::middleware::LOGIN_PATH;
use crate::session::FLASH_KEY;
use crate::state::{AppState, blocking};
use crate::templates::FormData;

/// `GET /account/view`
pub(super) async fn account_view(
    State(state): State<AppState>,
    session: Session,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    let Some(user_id) = ctx.authenticated_user_id else {
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    };

    let user = match state.users.get(user_id) {
        Ok(user) => user,
        Err(ModelError::NotFound) => return Ok(Redirect::to(LOGIN_PATH).into_response()),
        Err(err) => return Err(err.into()),
    };

    let mut data = template_data(&session, &ctx).await?;
    data.user = Some(user);

    state.templates.render(StatusCode::OK, "account.html", &data)
}

/// `GET /account/password/update`
pub(super) async fn password_update(
    State(state): State<AppState>,
    session: Session,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    let data = template_data(&session, &ctx)
        .await?
        .with_form(FormData::PasswordUpdate(PasswordUpdateForm::default()));

    state.templates.render(StatusCode::OK, "password.html", &data)
}

/// `POST /account/password/update`
pub(super) async fn password_update_post(
    State(state): State<AppState>,
    session: Session,
    ctx: RequestContext,
    form: Result<Form<PasswordUpdateForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(mut form) = form?;

    let Some(user_id) = ctx.authenticated_user_id else {
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    };

    if form.validate() {
        let users = state.users.clone();
        let (current, new) = (form.current_password.clone(), form.new_password.clone());

        match blocking(move || users.password_update(user_id, &current, &new)).await? {
            Ok(()) => {
                tracing::info!(user_id = %user_id, "password updated");
                session
                    .insert(FLASH_KEY, "Your password has been updated!")
                    .await?;
                return Ok(Redirect::to("/account/view").into_response());
            }
            Err(ModelError::InvalidCredentials) => {
                form.validator
                    .add_field_error("current_password", BAD_CURRENT_PASSWORD);
            }
            Err(ModelError::NotFound) => return Ok(Redirect::to(LOGIN_PATH).into_response()),
            Err(err) => return Err(err.into()),
        }
    }

    let data = template_data(&session, &ctx)
        .await?
        .with_form(FormData::PasswordUpdate(form));
    state
        .templates
        .render(StatusCode::UNPROCESSABLE_ENTITY, "password.html", &data)
}
