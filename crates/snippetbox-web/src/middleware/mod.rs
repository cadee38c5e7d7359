//! Middleware chains.
//!
//! A chain is a list of [`Stage`]s applied by [`Chain::wrap`], first stage
//! outermost. Three chains exist:
//!
//! - [`STANDARD`]: every request (panic recovery, request log, security headers, time limit)
//! - [`DYNAMIC`]: pages that use the session (session, CSRF, authentication context)
//! - [`PROTECTED`]: the dynamic chain plus the login gate

mod auth;
mod csrf;

use std::any::Any;
use std::convert::Infallible;

use axum::Router;
use axum::extract::Request;
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::{from_fn, from_fn_with_state, map_response};
use axum::response::{IntoResponse, Response};
use axum::routing::Route;
use tower::{Layer, Service};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, Span};

use crate::error::error_page;
use crate::session::session_layer;
use crate::state::AppState;

pub use auth::{LOGIN_PATH, authenticate, require_authentication};
pub use csrf::{CSRF_HEADER, verify_csrf};

const CONTENT_SECURITY_POLICY: &str =
    "default-src 'self'; style-src 'self' fonts.googleapis.com; font-src fonts.gstatic.com";

/// One step of a middleware chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Turn a handler panic into a 500 with `Connection: close`.
    RecoverPanic,
    /// One span per request with method, path and HTTP version.
    LogRequest,
    /// Security headers on every response.
    SecureHeaders,
    /// Answer 408 once a request outlives `Config::request_timeout`.
    Timeout,
    /// Load the session before the handler and persist it after.
    Session,
    /// Per-session CSRF token; rejects state-changing requests without it.
    Csrf,
    /// Mark the request authenticated if the session names a live user.
    Authenticate,
    /// Redirect anonymous requests to the login page.
    RequireAuthentication,
}

/// Which requests a chain's layers see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Everything reaching the router, fallbacks included.
    Router,
    /// Only requests that matched one of the router's routes.
    Routes,
}

/// An ordered, named list of stages.
#[derive(Debug, Clone, Copy)]
pub struct Chain {
    pub name: &'static str,
    scope: Scope,
    stages: &'static [Stage],
}

pub const STANDARD: Chain = Chain {
    name: "standard",
    scope: Scope::Router,
    stages: &[
        Stage::RecoverPanic,
        Stage::LogRequest,
        Stage::SecureHeaders,
        Stage::Timeout,
    ],
};

pub const DYNAMIC: Chain = Chain {
    name: "dynamic",
    scope: Scope::Routes,
    stages: &[Stage::Session, Stage::Csrf, Stage::Authenticate],
};

pub const PROTECTED: Chain = Chain {
    name: "protected",
    scope: Scope::Routes,
    stages: &[
        Stage::Session,
        Stage::Csrf,
        Stage::Authenticate,
        Stage::RequireAuthentication,
    ],
};

impl Chain {
    /// Apply every stage to `router`. The first stage sees the request first.
    pub fn wrap(&self, router: Router<AppState>, state: &AppState) -> Router<AppState> {
        tracing::debug!(chain = self.name, stages = ?self.stages, "applying middleware chain");

        // Each layer call wraps what is already there, so go innermost first.
        self.stages
            .iter()
            .rev()
            .fold(router, |router, stage| stage.apply(router, self.scope, state))
    }
}

impl Stage {
    fn apply(self, router: Router<AppState>, scope: Scope, state: &AppState) -> Router<AppState> {
        match self {
            Stage::RecoverPanic => add(router, scope, CatchPanicLayer::custom(handle_panic)),
            Stage::LogRequest => add(
                router,
                scope,
                TraceLayer::new_for_http()
                    .make_span_with(request_span)
                    .on_request(DefaultOnRequest::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            ),
            Stage::SecureHeaders => add(router, scope, map_response(secure_headers)),
            Stage::Timeout => add(
                router,
                scope,
                TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    state.config.request_timeout,
                ),
            ),
            Stage::Session => add(
                router,
                scope,
                session_layer(state.sessions.clone(), &state.config),
            ),
            Stage::Csrf => add(router, scope, from_fn(verify_csrf)),
            Stage::Authenticate => add(router, scope, from_fn_with_state(state.clone(), authenticate)),
            Stage::RequireAuthentication => add(router, scope, from_fn(require_authentication)),
        }
    }
}

fn add<L>(router: Router<AppState>, scope: Scope, layer: L) -> Router<AppState>
where
    L: Layer<Route> + Clone + Send + Sync + 'static,
    L::Service: Service<Request> + Clone + Send + Sync + 'static,
    <L::Service as Service<Request>>::Response: IntoResponse + 'static,
    <L::Service as Service<Request>>::Error: Into<Infallible> + 'static,
    <L::Service as Service<Request>>::Future: Send + 'static,
{
    match scope {
        Scope::Router => router.layer(layer),
        Scope::Routes => router.route_layer(layer),
    }
}

fn request_span(request: &Request) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        version = ?request.version(),
    )
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };

    tracing::error!(panic = %detail, "handler panicked");

    let status = StatusCode::INTERNAL_SERVER_ERROR;
    (status, [(header::CONNECTION, "close")], error_page(status)).into_response()
}

async fn secure_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CONTENT_SECURITY_POLICY),
    );
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("origin-when-cross-origin"),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("deny"));
    headers.insert(header::X_XSS_PROTECTION, HeaderValue::from_static("0"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::routing::get;
    use tower::ServiceExt;

    use crate::config::Config;

    fn state() -> AppState {
        let db = snippetbox_core::open_in_memory().unwrap();
        AppState::new(Config::default(), db)
    }

    #[test]
    fn protected_extends_dynamic() {
        let dynamic = DYNAMIC.stages;
        let protected = PROTECTED.stages;
        assert_eq!(&protected[..dynamic.len()], dynamic);
        assert_eq!(protected.last(), Some(&Stage::RequireAuthentication));
    }

    #[test]
    fn standard_recovers_first() {
        assert_eq!(
            STANDARD.stages,
            &[
                Stage::RecoverPanic,
                Stage::LogRequest,
                Stage::SecureHeaders,
                Stage::Timeout,
            ]
        );
    }

    #[tokio::test]
    async fn slow_request_times_out_with_408() {
        let config = Config {
            request_timeout: std::time::Duration::from_millis(50),
            ..Config::default()
        };
        let state = AppState::new(config, snippetbox_core::open_in_memory().unwrap());
        async fn stall() -> &'static str {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            "late"
        }

        let router = Router::new().route("/stall", get(stall));
        let app = STANDARD.wrap(router, &state).with_state(state);

        let res = app
            .oneshot(Request::get("/stall").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(res.headers()[header::X_FRAME_OPTIONS], "deny");
    }

    #[tokio::test]
    async fn panic_becomes_500_with_connection_close() {
        let state = state();
        async fn boom() -> &'static str {
            panic!("deliberate")
        }

        let router = Router::new().route("/boom", get(boom));
        let app = STANDARD.wrap(router, &state).with_state(state);

        let res = app
            .oneshot(Request::get("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.headers()[header::CONNECTION], "close");
    }

    #[tokio::test]
    async fn secure_headers_are_set() {
        let state = state();
        let router = Router::new().route("/", get(|| async { "hi" }));
        let app = STANDARD.wrap(router, &state).with_state(state);

        let res = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let h = res.headers();
        assert_eq!(h[header::CONTENT_SECURITY_POLICY], CONTENT_SECURITY_POLICY);
        assert_eq!(h[header::REFERRER_POLICY], "origin-when-cross-origin");
        assert_eq!(h[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(h[header::X_FRAME_OPTIONS], "deny");
        assert_eq!(h[header::X_XSS_PROTECTION], "0");
    }
}
