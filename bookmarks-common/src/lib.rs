//! # Smart Bookmarks Common Library
//!
//! Shared code for the bookmark manager:
//! - Domain models (bookmarks, users, session tokens)
//! - Bookmark Store and Session Provider interfaces with SQLite implementations
//! - The per-session bookmark collection controller and session gate
//! - Configuration loading and database initialization
//! - URL display helpers

pub mod collection;
pub mod config;
pub mod db;
pub mod error;
pub mod links;
pub mod models;
pub mod session;
pub mod store;
pub mod time;

pub use collection::{BookmarkCollection, CreateOutcome, DeleteOutcome, Entry, EntryStatus};
pub use error::{Error, Result};
pub use models::{Bookmark, BookmarkId, NewBookmark, SessionToken, User, UserId};
pub use session::{SessionProvider, SessionState, SignInRequest};
pub use store::BookmarkStore;
