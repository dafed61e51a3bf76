//! Domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier of an authenticated user (bookmark owner)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Store-assigned bookmark identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookmarkId(pub Uuid);

impl BookmarkId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BookmarkId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookmarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for BookmarkId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Identity issued by the Session Provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
}

/// A persisted bookmark as returned by the Bookmark Store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: BookmarkId,
    pub owner: UserId,
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for the Bookmark Store
///
/// Only constructible through [`NewBookmark::new`], so every value that reaches a
/// store has a trimmed, non-empty title and url.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBookmark {
    title: String,
    url: String,
    owner: UserId,
}

impl NewBookmark {
    /// Trim both fields; `None` if either ends up empty
    pub fn new(title: &str, url: &str, owner: UserId) -> Option<Self> {
        let title = title.trim();
        let url = url.trim();
        if title.is_empty() || url.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            url: url.to_string(),
            owner,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }
}

/// Opaque bearer token identifying a signed-in browser session
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    // Never print the raw token
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(6).collect();
        write!(f, "{}…", prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_bookmark_trims_fields() {
        let owner = UserId::new();
        let new = NewBookmark::new("  Example ", "\thttps://example.com\n", owner).unwrap();
        assert_eq!(new.title(), "Example");
        assert_eq!(new.url(), "https://example.com");
        assert_eq!(new.owner(), owner);
    }

    #[test]
    fn test_new_bookmark_rejects_blank_fields() {
        let owner = UserId::new();
        assert!(NewBookmark::new("", "https://example.com", owner).is_none());
        assert!(NewBookmark::new("Example", "   ", owner).is_none());
        assert!(NewBookmark::new(" \n", "\t", owner).is_none());
    }

    #[test]
    fn test_ids_round_trip_through_strings() {
        let id = BookmarkId::new();
        let parsed: BookmarkId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<UserId>().is_err());
    }

    #[test]
    fn test_session_token_display_is_redacted() {
        let token = SessionToken::new("abcdef0123456789");
        assert_eq!(token.to_string(), "abcdef…");
        assert_eq!(token.as_str(), "abcdef0123456789");
    }
}
