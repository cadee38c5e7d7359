//! CSRF protection using a per-session synchronizer token.

use axum::body::{Body, to_bytes};
use axum::extract::Request;
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand_core::{OsRng, RngCore};
use subtle::ConstantTimeEq;
use tower_sessions::Session;

use crate::context::RequestContext;
use crate::error::AppError;
use crate::session::CSRF_TOKEN_KEY;

/// Header accepted in place of the `csrf_token` form field.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Form field carrying the token.
const CSRF_FIELD: &str = "csrf_token";

const TOKEN_BYTES: usize = 32;

/// Upper bound on a buffered form body.
const MAX_FORM_BYTES: usize = 1024 * 1024;

/// Ensure the session has a CSRF token and check it on state-changing requests.
///
/// On success the token is published to handlers through [`RequestContext`].
pub async fn verify_csrf(request: Request, next: Next) -> Result<Response, AppError> {
    let session = request
        .extensions()
        .get::<Session>()
        .cloned()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("session layer missing")))?;

    let token = match session.get::<String>(CSRF_TOKEN_KEY).await? {
        Some(token) => token,
        None => {
            let token = generate_token();
            session.insert(CSRF_TOKEN_KEY, &token).await?;
            token
        }
    };

    let mut request = if is_safe(request.method()) {
        request
    } else {
        check_token(request, &token).await?
    };

    let mut ctx = request
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_default();
    ctx.csrf_token = token;
    request.extensions_mut().insert(ctx);

    Ok(next.run(request).await)
}

fn is_safe(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Buffer the body, compare the submitted token and hand back an equivalent request.
async fn check_token(request: Request, expected: &str) -> Result<Request, AppError> {
    let (parts, body) = request.into_parts();

    let bytes = to_bytes(body, MAX_FORM_BYTES)
        .await
        .map_err(|e| AppError::BadRequest(format!("unreadable body: {e}")))?;

    let submitted = match parts.headers.get(CSRF_HEADER) {
        Some(value) => value.to_str().ok().map(str::to_owned),
        None => form_token(&bytes),
    };

    match submitted {
        Some(submitted) if tokens_equal(submitted.as_bytes(), expected.as_bytes()) => {
            Ok(Request::from_parts(parts, Body::from(bytes)))
        }
        Some(_) => {
            tracing::warn!(path = %parts.uri.path(), "csrf token mismatch");
            Err(AppError::BadRequest("invalid CSRF token".to_string()))
        }
        None => {
            tracing::warn!(path = %parts.uri.path(), "csrf token missing");
            Err(AppError::BadRequest("missing CSRF token".to_string()))
        }
    }
}

fn form_token(body: &[u8]) -> Option<String> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body).ok()?;
    pairs
        .into_iter()
        .find(|(key, _)| key == CSRF_FIELD)
        .map(|(_, value)| value)
}

fn tokens_equal(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
