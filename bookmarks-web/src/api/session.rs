//! Session cookie handling
//!
//! The browser holds the bearer token in an HttpOnly cookie; everything else about
//! the session lives with the Session Provider.

use axum::http::{header, HeaderMap};
use bookmarks_common::{SessionState, SessionToken};

use crate::settings::SESSION_COOKIE;
use crate::{AppState, WebSettings};

/// Session token from the request's `Cookie` headers, if any
pub fn session_token(headers: &HeaderMap) -> Option<SessionToken> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| SessionToken::new(value))
}

/// Resolve the request's session through the gate
///
/// The token is returned alongside so handlers can key the workspace cache.
pub async fn resolve(state: &AppState, headers: &HeaderMap) -> (Option<SessionToken>, SessionState) {
    let token = session_token(headers);
    let session = SessionState::resolve(state.sessions.as_ref(), token.as_ref()).await;
    (token, session)
}

/// `Set-Cookie` value establishing a session
pub fn session_cookie(token: &SessionToken, settings: &WebSettings) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token.as_str(),
        settings.session_ttl.as_secs()
    );
    if settings.secure_cookies() {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value expiring the session cookie
pub fn cleared_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}
