//! Route definitions.
//!
//! ## Routes
//!
//! Standard chain only:
//! - `GET /ping` - Liveness check
//! - `GET /static/*` - Static assets
//!
//! Dynamic chain:
//! - `GET /` - Latest snippets
//! - `GET /about` - About page
//! - `GET /snippet/view/{id}` - One snippet
//! - `GET|POST /user/signup` - Create an account
//! - `GET|POST /user/login` - Log in
//!
//! Protected chain:
//! - `GET|POST /snippet/create` - New snippet
//! - `POST /user/logout` - Log out
//! - `GET /account/view` - Account details
//! - `GET|POST /account/password/update` - Change password

mod account;
mod health;
mod pages;
mod snippets;
mod users;

use axum::Router;
use axum::routing::{get, post};
use tower_http::services::ServeDir;
use tower_sessions::Session;

use crate::context::RequestContext;
use crate::error::AppError;
use crate::middleware::{DYNAMIC, PROTECTED, STANDARD};
use crate::session::FLASH_KEY;
use crate::state::AppState;
use crate::templates::TemplateData;

/// Build the complete application router.
pub fn router(state: AppState) -> Router {
    let dynamic = Router::new()
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        .route("/snippet/view/{id}", get(snippets::snippet_view))
        .route("/user/signup", get(users::signup).post(users::signup_post))
        .route("/user/login", get(users::login).post(users::login_post));

    let protected = Router::new()
        .route(
            "/snippet/create",
            get(snippets::snippet_create).post(snippets::snippet_create_post),
        )
        .route("/user/logout", post(users::logout_post))
        .route("/account/view", get(account::account_view))
        .route(
            "/account/password/update",
            get(account::password_update).post(account::password_update_post),
        );

    let app = Router::new()
        .route("/ping", get(health::ping))
        .nest_service("/static", ServeDir::new(&state.config.static_dir))
        .merge(DYNAMIC.wrap(dynamic, &state))
        .merge(PROTECTED.wrap(protected, &state))
        .fallback(not_found);

    STANDARD.wrap(app, &state).with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound
}

/// Base template data for this request, consuming any pending flash message.
async fn template_data(session: &Session, ctx: &RequestContext) -> Result<TemplateData, AppError> {
    let flash = session.remove::<String>(FLASH_KEY).await?;
    Ok(TemplateData::new(ctx, flash))
}
