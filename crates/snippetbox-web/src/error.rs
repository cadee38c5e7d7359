//! Error types for the web layer.
//!
//! Errors are rendered as small HTML pages. Server-side detail is logged and
//! never sent to the client.

use axum::extract::rejection::FormRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use maud::{DOCTYPE, Markup, html};

/// Web layer error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No such page or record.
    #[error("not found")]
    NotFound,

    /// Malformed request body or failed CSRF check.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Session load or save failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Anything else that should never happen.
    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl From<snippetbox_core::Error> for AppError {
    fn from(err: snippetbox_core::Error) -> Self {
        match err {
            snippetbox_core::Error::NotFound => Self::NotFound,
            other => Self::Internal(other.into()),
        }
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Plain error page shared by [`AppError`] and the panic handler.
pub fn error_page(status: StatusCode) -> Markup {
    let title = status.canonical_reason().unwrap_or("Error");

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (status.as_u16()) " " (title) " - Snippetbox" }
                link rel="stylesheet" href="/static/css/main.css";
            }
            body {
                header {
                    h1 { a href="/" { "Snippetbox" } }
                }
                main {
                    h2 { (title) }
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::BadRequest(reason) => {
                tracing::debug!(reason = %reason, "bad request");
                StatusCode::BAD_REQUEST
            }
            Self::Session(err) => {
                tracing::error!(error = %err, "session error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Internal(err) => {
                tracing::error!(error = ?err, "internal server error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, error_page(status)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_bad_request() {
        let err = AppError::BadRequest("missing field".to_string());
        assert_eq!(err.to_string(), "bad request: missing field");
    }

    #[test]
    fn error_display_internal() {
        let err = AppError::Internal(anyhow::anyhow!("something broke"));
        assert_eq!(err.to_string(), "internal error: something broke");
    }

    #[test]
    fn model_not_found_maps_to_not_found() {
        let err: AppError = snippetbox_core::Error::NotFound.into();
        assert!(matches!(err, AppError::NotFound));
    }

    #[test]
    fn other_model_errors_are_internal() {
        let err: AppError = snippetbox_core::Error::DuplicateEmail.into();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn error_into_response_statuses() {
        assert_eq!(
            AppError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::BadRequest("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom"))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_page_hides_detail() {
        let page = error_page(StatusCode::INTERNAL_SERVER_ERROR).into_string();
        assert!(page.contains("Internal Server Error"));
        assert!(!page.contains("boom"));
    }
}
