//! Runtime settings for the web layer, derived from the resolved configuration

use bookmarks_common::config::{IdentityConfig, TomlConfig};
use std::collections::BTreeMap;
use std::time::Duration;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "bookmarks_session";

#[derive(Debug, Clone)]
pub struct WebSettings {
    /// Externally visible base URL without trailing slash
    pub public_url: String,
    /// Upstream identity provider name passed on sign-in
    pub provider: String,
    pub query_params: BTreeMap<String, String>,
    pub session_ttl: Duration,
}

impl WebSettings {
    /// Settings with default identity options
    pub fn new(public_url: &str) -> Self {
        Self::with_identity(public_url, &IdentityConfig::default())
    }

    pub fn from_config(config: &TomlConfig, bind_address: &str) -> Self {
        let public_url = config
            .public_url
            .clone()
            .unwrap_or_else(|| format!("http://{}", bind_address));
        Self::with_identity(&public_url, &config.identity)
    }

    fn with_identity(public_url: &str, identity: &IdentityConfig) -> Self {
        Self {
            public_url: public_url.trim_end_matches('/').to_string(),
            provider: identity.provider.clone(),
            query_params: identity.query_params.clone(),
            session_ttl: Duration::from_secs(identity.bounded_session_ttl_hours() * 3600),
        }
    }

    /// Resolve a path against `public_url`; absolute URLs pass through
    pub fn absolute_url(&self, path_or_url: &str) -> String {
        if path_or_url.starts_with('/') {
            format!("{}{}", self.public_url, path_or_url)
        } else {
            path_or_url.to_string()
        }
    }

    /// Where the identity provider sends the browser back to
    pub fn callback_url(&self) -> String {
        self.absolute_url("/auth/callback")
    }

    pub fn secure_cookies(&self) -> bool {
        self.public_url.starts_with("https://")
    }

    /// Human-readable provider name for the sign-in button
    pub fn provider_label(&self) -> String {
        let mut chars = self.provider.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}
