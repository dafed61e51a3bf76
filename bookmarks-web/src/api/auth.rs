//! Sign-in round trip and sign-out
//!
//! Flow: `/auth/signin` redirects to the provider's authorization URL. The provider
//! sends the browser back to `/auth/callback?code=...`, where the code is exchanged
//! for a session cookie and the user's collection is seeded. Any failure along the
//! way lands the browser on `/` as anonymous.
//!
//! `/auth/dev-login` is the consent page of the built-in provider and only exists
//! when no external authorization endpoint is configured.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use bookmarks_common::{BookmarkCollection, Error, SignInRequest};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::session;
use crate::error::{ApiError, ApiResult};
use crate::ui;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DevLoginQuery {
    pub redirect_to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DevLoginForm {
    #[serde(default)]
    pub email: String,
    pub redirect_to: Option<String>,
}

/// GET /auth/signin
pub async fn sign_in(State(state): State<AppState>) -> Response {
    let request = SignInRequest {
        provider: state.settings.provider.clone(),
        redirect_to: state.settings.callback_url(),
        query_params: state.settings.query_params.clone(),
    };

    match state.sessions.sign_in(&request).await {
        Ok(authorization_url) => Redirect::to(&authorization_url).into_response(),
        Err(e) => {
            error!("Sign-in could not start: {}", e);
            Redirect::to("/").into_response()
        }
    }
}

/// GET /auth/callback?code=...
pub async fn callback(State(state): State<AppState>, Query(query): Query<CallbackQuery>) -> Response {
    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        warn!("Sign-in callback without a code");
        return Redirect::to("/").into_response();
    };

    let (token, user) = match state.sessions.complete_sign_in(&code).await {
        Ok(session) => session,
        Err(e) => {
            warn!("Sign-in callback rejected: {}", e);
            return Redirect::to("/").into_response();
        }
    };

    // Session start: seed the collection. A failed load is retried on the next page view.
    match BookmarkCollection::load(user.clone(), state.store.clone()).await {
        Ok(collection) => {
            state.workspaces.insert(token.clone(), collection).await;
        }
        Err(e) => error!("Initial bookmark load failed for {}: {}", user.email, e),
    }

    info!("Signed in {}", user.email);

    (
        [(header::SET_COOKIE, session::session_cookie(&token, &state.settings))],
        Redirect::to("/"),
    )
        .into_response()
}

/// POST /auth/signout
pub async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session::session_token(&headers) {
        if let Err(e) = state.sessions.sign_out(&token).await {
            warn!("Sign-out failed to revoke session {}: {}", token, e);
        }
        state.workspaces.remove(&token).await;
        info!("Signed out session {}", token);
    }

    (
        [(header::SET_COOKIE, session::cleared_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}

/// Only redirect back into this application
fn safe_redirect_target(state: &AppState, redirect_to: Option<&str>) -> String {
    let callback = state.settings.callback_url();
    match redirect_to {
        Some(target) if target.starts_with(&format!("{}/", state.settings.public_url)) => {
            target.to_string()
        }
        Some(target) => {
            warn!("Ignoring foreign redirect target {:?}", target);
            callback
        }
        None => callback,
    }
}

/// GET /auth/dev-login
pub async fn dev_login_page(
    State(state): State<AppState>,
    Query(query): Query<DevLoginQuery>,
) -> ApiResult<Html<String>> {
    if state.dev_login.is_none() {
        return Err(ApiError::NotFound("Built-in sign-in is disabled".to_string()));
    }

    let redirect_to = safe_redirect_target(&state, query.redirect_to.as_deref());
    Ok(Html(ui::dev_login(&redirect_to, "", false)))
}

/// POST /auth/dev-login
pub async fn dev_login_submit(
    State(state): State<AppState>,
    Form(form): Form<DevLoginForm>,
) -> ApiResult<Response> {
    let Some(provider) = state.dev_login.clone() else {
        return Err(ApiError::NotFound("Built-in sign-in is disabled".to_string()));
    };

    let redirect_to = safe_redirect_target(&state, form.redirect_to.as_deref());

    match provider.authorize(&form.email).await {
        Ok(code) => {
            let separator = if redirect_to.contains('?') { '&' } else { '?' };
            let target = format!("{}{}code={}", redirect_to, separator, code);
            Ok(Redirect::to(&target).into_response())
        }
        Err(Error::InvalidInput(_)) => Ok((
            StatusCode::BAD_REQUEST,
            Html(ui::dev_login(&redirect_to, &form.email, true)),
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

/// Build sign-in routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signin", get(sign_in))
        .route("/auth/callback", get(callback))
        .route("/auth/signout", post(sign_out))
        .route("/auth/dev-login", get(dev_login_page).post(dev_login_submit))
}
