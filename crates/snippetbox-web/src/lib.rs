//! Snippetbox web application.
//!
//! A server-rendered site for pasting and sharing short text snippets, with
//! user accounts and cookie sessions.
//!
//! # Architecture
//!
//! - **Routes**: axum handlers that validate forms, call the models and render pages
//! - **Middleware**: declared chains of stages (panic recovery, request logging,
//!   security headers, sessions, CSRF, authentication)
//! - **Templates**: maud pages registered by name in a cache built at startup
//! - **Sessions**: `tower-sessions` backed by the application's SQLite database
//!
//! # Security
//!
//! - All dynamic content is HTML-escaped by maud
//! - Every state-changing request must carry the session's CSRF token
//! - Session ids are renewed on login and logout
//! - Strict Content-Security-Policy and X-Frame-Options on every response

pub mod config;
pub mod context;
pub mod error;
pub mod forms;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod state;
pub mod templates;

pub use config::Config;
pub use error::AppError;
pub use routes::router;
pub use state::AppState;
