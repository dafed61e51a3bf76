//! Bookmark page and form handlers
//!
//! `GET /` renders either the landing page or the signed-in dashboard. Form posts
//! go through the session's collection controller and redirect back to `/`.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use bookmarks_common::{
    BookmarkCollection, BookmarkId, CreateOutcome, DeleteOutcome, SessionState, SessionToken, User,
};
use serde::Deserialize;
use tracing::{debug, error, warn};

use super::session;
use crate::ui::{self, FormValues};
use crate::workspace::SharedCollection;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    /// Present (any value) to re-fetch the collection from the store
    pub refresh: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

/// Session's collection, or a throwaway empty one when the initial load fails
async fn workspace(state: &AppState, token: &SessionToken, user: &User) -> Option<SharedCollection> {
    match state
        .workspaces
        .get_or_load(token, user, state.store.clone())
        .await
    {
        Ok(collection) => Some(collection),
        Err(e) => {
            error!("Failed to load bookmarks for {}: {}", user.email, e);
            None
        }
    }
}

fn render_dashboard(collection: &BookmarkCollection, form: &FormValues) -> Response {
    Html(ui::dashboard(collection, form)).into_response()
}

/// GET /
pub async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<IndexQuery>,
) -> Response {
    let (token, session) = session::resolve(&state, &headers).await;

    let (token, user) = match (token, session) {
        (Some(token), SessionState::Authenticated(user)) => (token, user),
        (Some(stale), SessionState::Anonymous) => {
            // Whatever was cached for a dead session is no longer reachable
            state.workspaces.remove(&stale).await;
            return Html(ui::landing(&state.settings)).into_response();
        }
        _ => return Html(ui::landing(&state.settings)).into_response(),
    };

    let Some(shared) = workspace(&state, &token, &user).await else {
        let empty = BookmarkCollection::new(user, state.store.clone());
        return render_dashboard(&empty, &FormValues::default());
    };

    let mut collection = shared.lock().await;
    if query.refresh.is_some() {
        if let Err(e) = collection.reload().await {
            warn!("Refresh failed for {}, showing cached bookmarks: {}", user.email, e);
        }
    }

    render_dashboard(&collection, &FormValues::default())
}

/// POST /bookmarks
///
/// On success the browser is sent back to `/`, which clears the form. Blank input
/// and store failures re-render the page with the submitted values kept.
pub async fn create_bookmark(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CreateForm>,
) -> Response {
    let (token, session) = session::resolve(&state, &headers).await;
    let (Some(token), SessionState::Authenticated(user)) = (token, session) else {
        return Redirect::to("/").into_response();
    };

    let Some(shared) = workspace(&state, &token, &user).await else {
        let empty = BookmarkCollection::new(user, state.store.clone());
        return render_dashboard(&empty, &FormValues::from(&form));
    };

    let mut collection = shared.lock().await;
    match collection.create(&form.title, &form.url).await {
        CreateOutcome::Created(_) => Redirect::to("/").into_response(),
        CreateOutcome::Rejected | CreateOutcome::Failed(_) => {
            render_dashboard(&collection, &FormValues::from(&form))
        }
    }
}

/// POST /bookmarks/:id/delete
pub async fn delete_bookmark(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let (token, session) = session::resolve(&state, &headers).await;
    let (Some(token), SessionState::Authenticated(user)) = (token, session) else {
        return Redirect::to("/").into_response();
    };

    let Ok(id) = id.parse::<BookmarkId>() else {
        debug!("Ignoring delete of malformed id {:?}", id);
        return Redirect::to("/").into_response();
    };

    if let Some(shared) = workspace(&state, &token, &user).await {
        let outcome = shared.lock().await.delete(id).await;
        debug!("Delete of {} by {}: {:?}", id, user.email, outcome);
        if let DeleteOutcome::Failed(reason) = outcome {
            warn!("Bookmark {} kept after failed delete: {}", id, reason);
        }
    }

    Redirect::to("/").into_response()
}

impl From<&CreateForm> for FormValues {
    fn from(form: &CreateForm) -> Self {
        FormValues {
            title: form.title.clone(),
            url: form.url.clone(),
        }
    }
}

/// Build bookmark routes
pub fn bookmark_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/bookmarks", post(create_bookmark))
        .route("/bookmarks/:id/delete", post(delete_bookmark))
}
