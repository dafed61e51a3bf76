//! In-memory Bookmark Store
//!
//! Used to drive the collection controller headlessly. Counts calls per operation
//! and can be told to fail inserts or deletes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use super::BookmarkStore;
use crate::{time, Bookmark, BookmarkId, Error, NewBookmark, Result, UserId};

#[derive(Default)]
pub struct MemoryBookmarkStore {
    // Insertion order; select sorts on read
    records: RwLock<Vec<Bookmark>>,
    select_calls: AtomicUsize,
    insert_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    fail_inserts: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryBookmarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing call counters
    pub async fn seed(&self, bookmark: Bookmark) {
        self.records.write().await.push(bookmark);
    }

    pub fn set_fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn select_calls(&self) -> usize {
        self.select_calls.load(Ordering::SeqCst)
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    /// Number of records held for any owner
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl BookmarkStore for MemoryBookmarkStore {
    async fn select(&self, owner: UserId) -> Result<Vec<Bookmark>> {
        self.select_calls.fetch_add(1, Ordering::SeqCst);

        let records = self.records.read().await;
        // Reverse first so the stable sort keeps later inserts ahead on equal timestamps
        let mut owned: Vec<Bookmark> = records
            .iter()
            .rev()
            .filter(|b| b.owner == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn insert(&self, bookmark: NewBookmark) -> Result<Bookmark> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(Error::Internal("insert rejected by store".to_string()));
        }

        let record = Bookmark {
            id: BookmarkId::new(),
            owner: bookmark.owner(),
            title: bookmark.title().to_string(),
            url: bookmark.url().to_string(),
            created_at: time::now(),
        };
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn delete_by_id(&self, caller: UserId, id: BookmarkId) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Error::Internal("delete rejected by store".to_string()));
        }

        self.records
            .write()
            .await
            .retain(|b| !(b.id == id && b.owner == caller));
        Ok(())
    }
}
