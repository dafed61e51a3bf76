//! bookmarks-web library
//!
//! Server-rendered presentation layer for Smart Bookmarks: routes, session cookie
//! handling, and HTML rendering on top of the `bookmarks-common` controller.

pub mod api;
pub mod error;
pub mod settings;
pub mod ui;
pub mod workspace;

pub use crate::error::{ApiError, ApiResult};
pub use crate::settings::WebSettings;
pub use crate::workspace::SessionWorkspaces;

use axum::Router;
use bookmarks_common::session::{SessionProvider, SqliteSessionProvider};
use bookmarks_common::store::BookmarkStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BookmarkStore>,
    pub sessions: Arc<dyn SessionProvider>,
    /// Consent step of the built-in identity provider; `None` when sign-in is
    /// delegated to an external authorization endpoint
    pub dev_login: Option<Arc<SqliteSessionProvider>>,
    /// Cached bookmark collections keyed by session
    pub workspaces: SessionWorkspaces,
    pub settings: Arc<WebSettings>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn BookmarkStore>,
        sessions: Arc<dyn SessionProvider>,
        settings: WebSettings,
    ) -> Self {
        Self {
            store,
            sessions,
            dev_login: None,
            workspaces: SessionWorkspaces::new(),
            settings: Arc::new(settings),
            startup_time: Utc::now(),
        }
    }

    pub fn with_dev_login(mut self, provider: Arc<SqliteSessionProvider>) -> Self {
        self.dev_login = Some(provider);
        self
    }
}

/// Drop expired sessions and codes, then the collections cached for them
///
/// Returns the number of purged session/code rows and evicted collections.
pub async fn purge_expired_sessions(
    provider: &SqliteSessionProvider,
    workspaces: &SessionWorkspaces,
) -> bookmarks_common::Result<(u64, usize)> {
    let purged = provider.purge_expired().await?;
    let evicted = workspaces.evict_signed_out(provider).await;
    Ok((purged, evicted))
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::bookmark_routes())
        .merge(api::auth_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
