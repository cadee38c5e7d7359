//! Per-request context populated by the dynamic middleware chain.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::AppError;

/// What the middleware learned about the current request.
///
/// Inserted into request extensions by the CSRF stage and updated by the
/// authenticate stage. Handlers extract it by type.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Set when the session names a user that still exists.
    pub authenticated_user_id: Option<Uuid>,

    /// Token to embed in every form rendered for this request.
    pub csrf_token: String,
}

impl RequestContext {
    pub fn is_authenticated(&self) -> bool {
        self.authenticated_user_id.is_some()
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!(
                    "request context missing; route is not behind the dynamic chain"
                ))
            })
    }
}
