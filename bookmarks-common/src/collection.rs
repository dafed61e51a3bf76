//! Bookmark collection controller
//!
//! One signed-in session's view of its owner's bookmarks: an ordered, newest-first
//! cache of the owner's slice of the [`BookmarkStore`]. All mutations go through here.
//!
//! The cache is seeded once by [`BookmarkCollection::load`] and is not a live
//! subscription; changes made from another session show up only after
//! [`BookmarkCollection::reload`].
//!
//! Store failures never escape as errors from `create`/`delete`. They are logged and
//! reported through the returned outcome, and the local sequence only ever reflects
//! confirmed store state.

use std::sync::Arc;
use tracing::{debug, error, info};

use crate::store::BookmarkStore;
use crate::{Bookmark, BookmarkId, NewBookmark, Result, User};

/// UI state of a single entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Active,
    /// Store delete issued, awaiting the result
    Removing,
    /// Last store delete failed; the bookmark is still persisted
    DeleteFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub bookmark: Bookmark,
    pub status: EntryStatus,
}

impl Entry {
    fn active(bookmark: Bookmark) -> Self {
        Self {
            bookmark,
            status: EntryStatus::Active,
        }
    }
}

/// Result of [`BookmarkCollection::create`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// Stored and prepended at index 0
    Created(Bookmark),
    /// Title or url blank after trimming; nothing was sent to the store
    Rejected,
    /// Store rejected the insert; local state unchanged
    Failed(String),
}

/// Result of [`BookmarkCollection::delete`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Store confirmed the delete and the entry is gone
    Removed,
    /// No local entry with that id; nothing was sent to the store
    NotPresent,
    /// Store rejected the delete; the entry stays, marked `DeleteFailed`
    Failed(String),
}

pub struct BookmarkCollection {
    owner: User,
    store: Arc<dyn BookmarkStore>,
    entries: Vec<Entry>,
}

impl BookmarkCollection {
    /// Empty collection for `owner`, without touching the store
    pub fn new(owner: User, store: Arc<dyn BookmarkStore>) -> Self {
        Self {
            owner,
            store,
            entries: Vec::new(),
        }
    }

    /// Seed a collection from the owner's bookmarks, newest first
    pub async fn load(owner: User, store: Arc<dyn BookmarkStore>) -> Result<Self> {
        let mut collection = Self::new(owner, store);
        collection.reload().await?;
        Ok(collection)
    }

    /// Replace the local sequence with a fresh point-in-time fetch
    ///
    /// On error the previous sequence is kept.
    pub async fn reload(&mut self) -> Result<()> {
        let bookmarks = self.store.select(self.owner.id).await?;
        info!("Loaded {} bookmarks for {}", bookmarks.len(), self.owner.email);
        self.entries = bookmarks.into_iter().map(Entry::active).collect();
        Ok(())
    }

    pub fn owner(&self) -> &User {
        &self.owner
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn bookmarks(&self) -> impl Iterator<Item = &Bookmark> {
        self.entries.iter().map(|e| &e.bookmark)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: BookmarkId) -> bool {
        self.position(id).is_some()
    }

    pub fn status(&self, id: BookmarkId) -> Option<EntryStatus> {
        self.position(id).map(|i| self.entries[i].status)
    }

    fn position(&self, id: BookmarkId) -> Option<usize> {
        self.entries.iter().position(|e| e.bookmark.id == id)
    }

    /// Store a new bookmark and put it at the front
    pub async fn create(&mut self, title: &str, url: &str) -> CreateOutcome {
        let Some(new) = NewBookmark::new(title, url, self.owner.id) else {
            debug!("Ignoring bookmark submission with blank title or url");
            return CreateOutcome::Rejected;
        };

        match self.store.insert(new).await {
            Ok(bookmark) => {
                debug!("Created bookmark {} for {}", bookmark.id, self.owner.email);
                self.entries.insert(0, Entry::active(bookmark.clone()));
                CreateOutcome::Created(bookmark)
            }
            Err(e) => {
                error!("Failed to create bookmark for {}: {}", self.owner.email, e);
                CreateOutcome::Failed(e.to_string())
            }
        }
    }

    /// Delete a bookmark from the store, then drop it locally once confirmed
    pub async fn delete(&mut self, id: BookmarkId) -> DeleteOutcome {
        let Some(index) = self.position(id) else {
            debug!("Delete of {} ignored: not in collection", id);
            return DeleteOutcome::NotPresent;
        };
        self.entries[index].status = EntryStatus::Removing;

        let result = self.store.delete_by_id(self.owner.id, id).await;

        // The sequence is only mutated through `&mut self`, so `index` is still valid
        match result {
            Ok(()) => {
                self.entries.remove(index);
                debug!("Deleted bookmark {} for {}", id, self.owner.email);
                DeleteOutcome::Removed
            }
            Err(e) => {
                self.entries[index].status = EntryStatus::DeleteFailed;
                error!("Failed to delete bookmark {} for {}: {}", id, self.owner.email, e);
                DeleteOutcome::Failed(e.to_string())
            }
        }
    }
}

impl std::fmt::Debug for BookmarkCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookmarkCollection")
            .field("owner", &self.owner)
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}
