//! Integration tests for bookmarks-web routes
//!
//! Each test runs against its own temporary SQLite session database, with an
//! in-memory Bookmark Store so store calls and failures can be observed.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use bookmarks_common::db::init_database;
use bookmarks_common::session::{SessionProvider, SqliteSessionProvider};
use bookmarks_common::store::{BookmarkStore, MemoryBookmarkStore};
use bookmarks_common::{Bookmark, BookmarkId, NewBookmark, SessionToken, User, UserId};
use bookmarks_web::{build_router, purge_expired_sessions, AppState, WebSettings};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

const PUBLIC_URL: &str = "http://localhost:5780";

struct TestApp {
    _dir: TempDir,
    app: Router,
    state: AppState,
    store: Arc<MemoryBookmarkStore>,
    sessions: Arc<SqliteSessionProvider>,
}

/// Test helper: app with the built-in sign-in enabled
async fn setup_app() -> TestApp {
    setup_app_with(true).await
}

async fn setup_app_with(dev_login: bool) -> TestApp {
    setup_app_with_ttl(dev_login, chrono::Duration::hours(720)).await
}

async fn setup_app_with_ttl(dev_login: bool, session_ttl: chrono::Duration) -> TestApp {
    let dir = TempDir::new().expect("Should create temp dir");
    let pool = init_database(&dir.path().join("bookmarks.db"))
        .await
        .expect("Should initialize database");

    let settings = WebSettings::new(PUBLIC_URL);
    let sessions = Arc::new(
        SqliteSessionProvider::new(pool, settings.absolute_url("/auth/dev-login"))
            .with_session_ttl(session_ttl),
    );
    let store = Arc::new(MemoryBookmarkStore::new());

    let mut state = AppState::new(store.clone(), sessions.clone(), settings);
    if dev_login {
        state = state.with_dev_login(sessions.clone());
    }

    TestApp {
        _dir: dir,
        app: build_router(state.clone()),
        state,
        store,
        sessions,
    }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Run the full consent + callback round trip; returns the `Cookie` header value
    async fn sign_in(&self, email: &str) -> String {
        let code = self.sessions.authorize(email).await.unwrap();
        let response = self
            .send(get(&format!("/auth/callback?code={}", code), None))
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_cookie(&response).expect("Callback should set the session cookie")
    }

    async fn user(&self, cookie: &str) -> User {
        let token = cookie.trim_start_matches("bookmarks_session=");
        self.sessions
            .current_user(&SessionToken::new(token))
            .await
            .unwrap()
            .expect("Session should be live")
    }
}

/// Test helper: GET request, optionally carrying a cookie
fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Test helper: urlencoded form POST, optionally carrying a cookie
fn post_form(uri: &str, form: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(form.to_string())).unwrap()
}

/// Test helper: `name=value` part of the Set-Cookie header
fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.to_string())
}

fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn extract_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Body should be UTF-8")
}

async fn extract_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

// =============================================================================
// Health Endpoint
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_session_required() {
    let t = setup_app().await;

    let response = t.send(get("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "bookmarks-web");
    assert!(body["version"].is_string());
    assert_eq!(body["active_sessions"], 0);
}

// =============================================================================
// Session Gate
// =============================================================================

#[tokio::test]
async fn test_anonymous_index_shows_landing_without_store_reads() {
    let t = setup_app().await;

    let response = t.send(get("/", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = extract_text(response).await;
    assert!(html.contains("Beautifully Organized"));
    assert!(html.contains("Continue with Google"));
    assert!(!html.contains("My Bookmarks"));
    assert_eq!(t.store.select_calls(), 0);
}

#[tokio::test]
async fn test_unknown_session_cookie_is_anonymous() {
    let t = setup_app().await;

    let response = t.send(get("/", Some("bookmarks_session=not-a-session"))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = extract_text(response).await;
    assert!(html.contains("Continue with Google"));
    assert_eq!(t.store.select_calls(), 0);
}

#[tokio::test]
async fn test_unauthenticated_mutations_redirect_without_store_calls() {
    let t = setup_app().await;

    let response = t
        .send(post_form("/bookmarks", "title=A&url=https%3A%2F%2Fa.com", None))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let id = BookmarkId::new();
    let response = t
        .send(post_form(&format!("/bookmarks/{}/delete", id), "", None))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    assert_eq!(t.store.insert_calls(), 0);
    assert_eq!(t.store.delete_calls(), 0);
}

// =============================================================================
// Sign-in Round Trip
// =============================================================================

#[tokio::test]
async fn test_sign_in_redirects_to_authorization_url() {
    let t = setup_app().await;

    let response = t.send(get("/auth/signin", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let target = location(&response);
    assert!(target.starts_with("http://localhost:5780/auth/dev-login?"));
    assert!(target.contains("provider=google"));
    assert!(target.contains("redirect_to=http%3A%2F%2Flocalhost%3A5780%2Fauth%2Fcallback"));
    assert!(target.contains("access_type=offline"));
    assert!(target.contains("prompt=consent"));
}

#[tokio::test]
async fn test_callback_sets_cookie_and_seeds_collection() {
    let t = setup_app().await;

    let cookie = t.sign_in("reader@example.com").await;
    assert!(cookie.starts_with("bookmarks_session="));
    assert_eq!(t.state.workspaces.len().await, 1);
    assert_eq!(t.store.select_calls(), 1);

    let response = t.send(get("/", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = extract_text(response).await;
    assert!(html.contains("reader@example.com"));
    assert!(html.contains("No bookmarks yet"));
    // Page views use the cached collection
    assert_eq!(t.store.select_calls(), 1);
}

#[tokio::test]
async fn test_callback_cookie_attributes() {
    let t = setup_app().await;
    let code = t.sessions.authorize("reader@example.com").await.unwrap();

    let response = t
        .send(get(&format!("/auth/callback?code={}", code), None))
        .await;
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Path=/"));
    assert!(!set_cookie.contains("Secure"));
}

#[tokio::test]
async fn test_callback_with_bad_code_stays_anonymous() {
    let t = setup_app().await;

    let response = t.send(get("/auth/callback?code=bogus", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    let response = t.send(get("/auth/callback", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_code_cannot_be_replayed() {
    let t = setup_app().await;
    let code = t.sessions.authorize("reader@example.com").await.unwrap();

    let first = t
        .send(get(&format!("/auth/callback?code={}", code), None))
        .await;
    assert!(session_cookie(&first).is_some());

    let second = t
        .send(get(&format!("/auth/callback?code={}", code), None))
        .await;
    assert!(session_cookie(&second).is_none());
}

#[tokio::test]
async fn test_sign_out_clears_cookie_and_workspace() {
    let t = setup_app().await;
    let cookie = t.sign_in("reader@example.com").await;

    let response = t.send(post_form("/auth/signout", "", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("bookmarks_session=;"));
    assert!(set_cookie.contains("Max-Age=0"));
    assert!(t.state.workspaces.is_empty().await);

    // The revoked token no longer authenticates
    let html = extract_text(t.send(get("/", Some(&cookie))).await).await;
    assert!(html.contains("Continue with Google"));
}

// =============================================================================
// Built-in Sign-in Page
// =============================================================================

#[tokio::test]
async fn test_dev_login_submit_redirects_with_code() {
    let t = setup_app().await;

    let response = t
        .send(post_form(
            "/auth/dev-login",
            "email=New%40Example.com&redirect_to=http%3A%2F%2Flocalhost%3A5780%2Fauth%2Fcallback",
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let target = location(&response);
    let prefix = "http://localhost:5780/auth/callback?code=";
    assert!(target.starts_with(prefix));

    let callback = target.trim_start_matches("http://localhost:5780");
    let response = t.send(get(callback, None)).await;
    let cookie = session_cookie(&response).expect("Should sign in");

    assert_eq!(t.user(&cookie).await.email, "new@example.com");
}

#[tokio::test]
async fn test_dev_login_rejects_invalid_email() {
    let t = setup_app().await;

    let response = t
        .send(post_form("/auth/dev-login", "email=not-an-email", None))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let html = extract_text(response).await;
    assert!(html.contains("Enter a valid email address."));
    assert!(html.contains(r#"value="not-an-email""#));
}

#[tokio::test]
async fn test_dev_login_ignores_foreign_redirect_target() {
    let t = setup_app().await;

    let response = t
        .send(get("/auth/dev-login?redirect_to=https%3A%2F%2Fevil.example%2Fsteal", None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = extract_text(response).await;
    assert!(!html.contains("evil.example"));
    assert!(html.contains("http://localhost:5780/auth/callback"));
}

#[tokio::test]
async fn test_dev_login_disabled_returns_404() {
    let t = setup_app_with(false).await;

    let response = t.send(get("/auth/dev-login", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let response = t
        .send(post_form("/auth/dev-login", "email=a%40b.com", None))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_redirects_and_lists_bookmark() {
    let t = setup_app().await;
    let cookie = t.sign_in("reader@example.com").await;

    let response = t
        .send(post_form(
            "/bookmarks",
            "title=+Rust+Book+&url=https%3A%2F%2Fdoc.rust-lang.org%2Fbook%2F",
            Some(&cookie),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert_eq!(t.store.insert_calls(), 1);

    let html = extract_text(t.send(get("/", Some(&cookie))).await).await;
    assert!(html.contains("<h3>Rust Book</h3>"));
    assert!(html.contains(">doc.rust-lang.org</a>"));
    assert!(html.contains("1 bookmark saved"));
}

#[tokio::test]
async fn test_newest_bookmark_listed_first() {
    let t = setup_app().await;
    let cookie = t.sign_in("reader@example.com").await;

    for (title, url) in [("First", "https%3A%2F%2Fa.com"), ("Second", "https%3A%2F%2Fb.com")] {
        t.send(post_form(
            "/bookmarks",
            &format!("title={}&url={}", title, url),
            Some(&cookie),
        ))
        .await;
    }

    let html = extract_text(t.send(get("/", Some(&cookie))).await).await;
    let second = html.find("<h3>Second</h3>").unwrap();
    let first = html.find("<h3>First</h3>").unwrap();
    assert!(second < first);
    assert!(html.contains("2 bookmarks saved"));
}

#[tokio::test]
async fn test_blank_create_keeps_form_values() {
    let t = setup_app().await;
    let cookie = t.sign_in("reader@example.com").await;

    let response = t
        .send(post_form(
            "/bookmarks",
            "title=+++&url=https%3A%2F%2Fexample.com",
            Some(&cookie),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(t.store.insert_calls(), 0);

    let html = extract_text(response).await;
    assert!(html.contains(r#"value="https://example.com""#));
    assert!(html.contains("No bookmarks yet"));
}

#[tokio::test]
async fn test_failed_create_keeps_form_values() {
    let t = setup_app().await;
    let cookie = t.sign_in("reader@example.com").await;
    t.store.set_fail_inserts(true);

    let response = t
        .send(post_form(
            "/bookmarks",
            "title=Lost&url=https%3A%2F%2Flost.example",
            Some(&cookie),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(t.store.insert_calls(), 1);

    let html = extract_text(response).await;
    assert!(html.contains(r#"value="Lost""#));
    assert!(html.contains("No bookmarks yet"));
    assert!(t.store.is_empty().await);
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_removes_bookmark() {
    let t = setup_app().await;
    let cookie = t.sign_in("reader@example.com").await;
    t.send(post_form(
        "/bookmarks",
        "title=Gone&url=https%3A%2F%2Fgone.example",
        Some(&cookie),
    ))
    .await;

    let owner = t.user(&cookie).await;
    let id = t.store.select(owner.id).await.unwrap()[0].id;

    let response = t
        .send(post_form(&format!("/bookmarks/{}/delete", id), "", Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(t.store.delete_calls(), 1);
    assert!(t.store.is_empty().await);

    let html = extract_text(t.send(get("/", Some(&cookie))).await).await;
    assert!(html.contains("No bookmarks yet"));
}

#[tokio::test]
async fn test_failed_delete_keeps_bookmark_marked() {
    let t = setup_app().await;
    let cookie = t.sign_in("reader@example.com").await;
    t.send(post_form(
        "/bookmarks",
        "title=Sticky&url=https%3A%2F%2Fsticky.example",
        Some(&cookie),
    ))
    .await;

    let owner = t.user(&cookie).await;
    let id = t.store.select(owner.id).await.unwrap()[0].id;
    t.store.set_fail_deletes(true);

    let response = t
        .send(post_form(&format!("/bookmarks/{}/delete", id), "", Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(t.store.len().await, 1);

    let html = extract_text(t.send(get("/", Some(&cookie))).await).await;
    assert!(html.contains("<h3>Sticky</h3>"));
    assert!(html.contains("Delete failed"));
}

#[tokio::test]
async fn test_delete_of_foreign_bookmark_never_reaches_store() {
    let t = setup_app().await;
    let cookie = t.sign_in("reader@example.com").await;

    let foreign = Bookmark {
        id: BookmarkId::new(),
        owner: UserId::new(),
        title: "Not yours".to_string(),
        url: "https://other.example".to_string(),
        created_at: chrono::Utc::now(),
    };
    t.store.seed(foreign.clone()).await;

    let response = t
        .send(post_form(
            &format!("/bookmarks/{}/delete", foreign.id),
            "",
            Some(&cookie),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(t.store.delete_calls(), 0);
    assert_eq!(t.store.len().await, 1);
}

#[tokio::test]
async fn test_delete_with_malformed_id_is_ignored() {
    let t = setup_app().await;
    let cookie = t.sign_in("reader@example.com").await;

    let response = t
        .send(post_form("/bookmarks/not-a-uuid/delete", "", Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(t.store.delete_calls(), 0);
}

// =============================================================================
// Refresh
// =============================================================================

#[tokio::test]
async fn test_refresh_picks_up_changes_from_other_sessions() {
    let t = setup_app().await;
    let cookie = t.sign_in("reader@example.com").await;
    let owner = t.user(&cookie).await;

    // Written through another session: not visible until refresh
    t.store
        .insert(NewBookmark::new("Elsewhere", "https://elsewhere.example", owner.id).unwrap())
        .await
        .unwrap();

    let html = extract_text(t.send(get("/", Some(&cookie))).await).await;
    assert!(!html.contains("Elsewhere"));

    let html = extract_text(t.send(get("/?refresh=1", Some(&cookie))).await).await;
    assert!(html.contains("<h3>Elsewhere</h3>"));
}

#[tokio::test]
async fn test_collection_is_loaded_lazily_when_not_cached() {
    let t = setup_app().await;
    let cookie = t.sign_in("reader@example.com").await;
    let owner = t.user(&cookie).await;
    t.store
        .insert(NewBookmark::new("Saved", "https://saved.example", owner.id).unwrap())
        .await
        .unwrap();

    // Simulates a server restart: the session survives, the cache does not
    let token = SessionToken::new(cookie.trim_start_matches("bookmarks_session="));
    assert!(t.state.workspaces.remove(&token).await);

    let html = extract_text(t.send(get("/", Some(&cookie))).await).await;
    assert!(html.contains("<h3>Saved</h3>"));
    assert_eq!(t.state.workspaces.len().await, 1);
}

// =============================================================================
// Session Expiry
// =============================================================================

#[tokio::test]
async fn test_purge_evicts_collections_of_expired_sessions() {
    let t = setup_app_with_ttl(true, chrono::Duration::zero()).await;

    for i in 0..5 {
        t.sign_in(&format!("user{}@example.com", i)).await;
    }
    assert_eq!(t.state.workspaces.len().await, 5);

    let (purged, evicted) = purge_expired_sessions(&t.sessions, &t.state.workspaces)
        .await
        .unwrap();

    assert_eq!(purged, 5);
    assert_eq!(evicted, 5);
    assert_eq!(t.state.workspaces.len().await, 0);

    let body = extract_json(t.send(get("/health", None)).await).await;
    assert_eq!(body["active_sessions"], 0);
}

#[tokio::test]
async fn test_purge_keeps_collections_of_live_sessions() {
    let t = setup_app().await;
    let cookie = t.sign_in("reader@example.com").await;

    let (_purged, evicted) = purge_expired_sessions(&t.sessions, &t.state.workspaces)
        .await
        .unwrap();

    assert_eq!(evicted, 0);
    assert_eq!(t.state.workspaces.len().await, 1);

    let html = extract_text(t.send(get("/", Some(&cookie))).await).await;
    assert!(html.contains("reader@example.com"));
}
