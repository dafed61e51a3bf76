//! Session Provider interface and the session gate
//!
//! The provider authenticates users through a redirect round trip and answers
//! "who is signed in" for a session token. [`SessionState`] collapses that answer
//! into the two states the presentation layer cares about.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::{Result, SessionToken, User};

pub mod sqlite;

pub use sqlite::SqliteSessionProvider;

/// Parameters for starting a sign-in round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInRequest {
    /// Upstream identity provider (e.g. "google")
    pub provider: String,
    /// Absolute URL the provider redirects back to with a one-time `code`
    pub redirect_to: String,
    /// Extra parameters forwarded to the provider
    pub query_params: BTreeMap<String, String>,
}

#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// User owning a live session, `None` for unknown or expired tokens
    async fn current_user(&self, token: &SessionToken) -> Result<Option<User>>;

    /// Authorization URL the browser should be redirected to
    async fn sign_in(&self, request: &SignInRequest) -> Result<String>;

    /// Exchange the one-time code from the redirect for a new session
    async fn complete_sign_in(&self, code: &str) -> Result<(SessionToken, User)>;

    /// Revoke a session; unknown tokens are ignored
    async fn sign_out(&self, token: &SessionToken) -> Result<()>;
}

/// Whether a request belongs to a signed-in user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated(User),
}

impl SessionState {
    /// Resolve a (possibly missing) token against the provider
    ///
    /// Provider failures are logged and treated as anonymous.
    pub async fn resolve(provider: &dyn SessionProvider, token: Option<&SessionToken>) -> Self {
        let Some(token) = token else {
            return SessionState::Anonymous;
        };

        match provider.current_user(token).await {
            Ok(Some(user)) => SessionState::Authenticated(user),
            Ok(None) => {
                debug!("Session {} is unknown or expired", token);
                SessionState::Anonymous
            }
            Err(e) => {
                warn!("Session resolution failed, treating as anonymous: {}", e);
                SessionState::Anonymous
            }
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Anonymous => None,
            SessionState::Authenticated(user) => Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}
