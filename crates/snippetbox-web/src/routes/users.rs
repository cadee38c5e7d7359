//! Signup, login and logout.

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
use crate::forms::{BAD_CREDENTIALS, DUPLICATE_EMAIL, LoginForm, SignupForm};
use crate::middleware::LOGIN_PATH;
use crate::session::{AUTHENTICATED_USER_ID_KEY, FLASH_KEY};
use crate::state::{AppState, blocking};
use crate::templates::FormData;

/// `GET /user/signup`
pub(super) async fn signup(
    State(state): State<AppState>,
    session: Session,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    let data = template_data(&session, &ctx)
        .await?
        .with_form(FormData::Signup(SignupForm::default()));

    state.templates.render(StatusCode::OK, "signup.html", &data)
}

/// `POST /user/signup`
pub(super) async fn signup_post(
    State(state): State<AppState>,
    session: Session,
    ctx: RequestContext,
    form: Result<Form<SignupForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(mut form) = form?;

    if form.validate() {
        let users = state.users.clone();
        let (name, email, password) = (
            form.name.clone(),
            form.email.clone(),
            form.password.clone(),
        );

        match blocking(move || users.insert(&name, &email, &password)).await? {
            Ok(id) => {
                tracing::info!(user_id = %id, "user signed up");
                session
                    .insert(FLASH_KEY, "Your signup was successful. Please log in.")
                    .await?;
                return Ok(Redirect::to(LOGIN_PATH).into_response());
            }
            Err(ModelError::DuplicateEmail) => {
                form.validator.add_field_error("email", DUPLICATE_EMAIL);
            }
            Err(err) => return Err(err.into()),
        }
    }

    let data = template_data(&session, &ctx)
        .await?
        .with_form(FormData::Signup(form));
    state
        .templates
        .render(StatusCode::UNPROCESSABLE_ENTITY, "signup.html", &data)
}

/// `GET /user/login`
pub(super) async fn login(
    State(state): State<AppState>,
    session: Session,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    let data = template_data(&session, &ctx)
        .await?
        .with_form(FormData::Login(LoginForm::default()));

    state.templates.render(StatusCode::OK, "login.html", &data)
}

/// `POST /user/login`
///
/// On success the session id is renewed before the user id is stored.
pub(super) async fn login_post(
    State(state): State<AppState>,
    session: Session,
    ctx: RequestContext,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(mut form) = form?;

    if form.validate() {
        let users = state.users.clone();
        let (email, password) = (form.email.clone(), form.password.clone());

        match blocking(move || users.authenticate(&email, &password)).await? {
            Ok(id) => {
                session.cycle_id().await?;
                session.insert(AUTHENTICATED_USER_ID_KEY, id).await?;
                tracing::info!(user_id = %id, "user logged in");
                return Ok(Redirect::to("/snippet/create").into_response());
            }
            Err(ModelError::InvalidCredentials) => {
                form.validator.add_non_field_error(BAD_CREDENTIALS);
            }
            Err(err) => return Err(err.into()),
        }
    }

    // Never send the password back.
    form.password.clear();

    let data = template_data(&session, &ctx)
        .await?
        .with_form(FormData::Login(form));
    state
        .templates
        .render(StatusCode::UNPROCESSABLE_ENTITY, "login.html", &data)
}

/// `POST /user/logout`
pub(super) async fn logout_post(
    session: Session,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    session.cycle_id().await?;
    session.remove_value(AUTHENTICATED_USER_ID_KEY).await?;
    session
        .insert(FLASH_KEY, "You've been logged out successfully!")
        .await?;

    if let Some(id) = ctx.authenticated_user_id {
        tracing::info!(user_id = %id, "user logged out");
    }

    Ok(Redirect::to("/").into_response())
}
