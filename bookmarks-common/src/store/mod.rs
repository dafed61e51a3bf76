//! Bookmark Store interface
//!
//! The durable, owner-scoped collection of bookmark records. Access control lives
//! here, not in the collection controller: every operation is scoped to the calling
//! user and never exposes or touches another owner's rows.

use async_trait::async_trait;

use crate::{Bookmark, BookmarkId, NewBookmark, Result, UserId};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryBookmarkStore;
pub use sqlite::SqliteBookmarkStore;

#[async_trait]
pub trait BookmarkStore: Send + Sync {
    /// All bookmarks owned by `owner`, newest `created_at` first
    async fn select(&self, owner: UserId) -> Result<Vec<Bookmark>>;

    /// Persist a bookmark, returning it with store-assigned `id` and `created_at`
    async fn insert(&self, bookmark: NewBookmark) -> Result<Bookmark>;

    /// Delete `id` if `caller` owns it
    ///
    /// Matching nothing (already deleted, or owned by someone else) is not an error.
    async fn delete_by_id(&self, caller: UserId, id: BookmarkId) -> Result<()>;
}
