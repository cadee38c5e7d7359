//! Application state shared across all request handlers.

use std::sync::Arc;

use snippetbox_core::{Db, SnippetModel, SnippetStore, UserModel, UserStore};

use crate::config::Config;
use crate::error::AppError;
use crate::session::SqliteSessionStore;
use crate::templates::TemplateCache;

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,

    /// Snippet storage.
    pub snippets: Arc<dyn SnippetStore>,

    /// User account storage.
    pub users: Arc<dyn UserStore>,

    /// Pages rendered by name.
    pub templates: Arc<TemplateCache>,

    /// Session storage, sharing the application database.
    pub sessions: SqliteSessionStore,
}

impl AppState {
    /// Create the state backed by the SQLite models on `db`.
    pub fn new(config: Config, db: Db) -> Self {
        Self::with_stores(
            config,
            Arc::new(SnippetModel::new(db.clone())),
            Arc::new(UserModel::new(db.clone())),
            SqliteSessionStore::new(db),
        )
    }

    /// Create the state from explicit stores.
    pub fn with_stores(
        config: Config,
        snippets: Arc<dyn SnippetStore>,
        users: Arc<dyn UserStore>,
        sessions: SqliteSessionStore,
    ) -> Self {
        let templates = Arc::new(TemplateCache::new());

        tracing::info!(
            secure_cookies = config.secure_cookies,
            static_dir = %config.static_dir.display(),
            "application state initialized"
        );

        Self {
            config: Arc::new(config),
            snippets,
            users,
            templates,
            sessions,
        }
    }
}

/// Run a model call that hashes or verifies a password off the async runtime.
///
/// The outer result only fails if the blocking task itself died.
pub async fn blocking<F, T>(f: F) -> Result<snippetbox_core::Result<T>, AppError>
where
    F: FnOnce() -> snippetbox_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("blocking task failed: {e}")))
}
