//! Per-session bookmark collections
//!
//! Each signed-in browser session owns one [`BookmarkCollection`] behind its own
//! mutex, so operations within a session run one at a time while sessions never
//! block each other.
//!
//! A collection is dropped on sign-out, or by [`SessionWorkspaces::evict_signed_out`]
//! once the provider no longer recognizes its session.

use bookmarks_common::store::BookmarkStore;
use bookmarks_common::{BookmarkCollection, Result, SessionProvider, SessionToken, User, UserId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

pub type SharedCollection = Arc<Mutex<BookmarkCollection>>;

/// Cached collection plus its owner, readable without locking the collection
#[derive(Clone)]
struct Workspace {
    owner: UserId,
    collection: SharedCollection,
}

impl Workspace {
    fn new(collection: BookmarkCollection) -> Self {
        Self {
            owner: collection.owner().id,
            collection: Arc::new(Mutex::new(collection)),
        }
    }
}

#[derive(Clone, Default)]
pub struct SessionWorkspaces {
    inner: Arc<RwLock<HashMap<SessionToken, Workspace>>>,
}

impl SessionWorkspaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, token: &SessionToken) -> Option<SharedCollection> {
        self.inner
            .read()
            .await
            .get(token)
            .map(|w| w.collection.clone())
    }

    /// Cache `collection` for `token`, replacing whatever was there
    pub async fn insert(&self, token: SessionToken, collection: BookmarkCollection) -> SharedCollection {
        let workspace = Workspace::new(collection);
        let shared = workspace.collection.clone();
        self.inner.write().await.insert(token, workspace);
        shared
    }

    /// Cache `collection` unless a collection for the same owner got there first
    ///
    /// Returns the collection that ended up cached.
    pub async fn insert_if_absent(
        &self,
        token: SessionToken,
        collection: BookmarkCollection,
    ) -> SharedCollection {
        let mut map = self.inner.write().await;
        match map.entry(token) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().owner != collection.owner().id {
                    occupied.insert(Workspace::new(collection));
                }
                occupied.get().collection.clone()
            }
            Entry::Vacant(vacant) => vacant.insert(Workspace::new(collection)).collection.clone(),
        }
    }

    /// Cached collection for `token`, seeding it from the store on first use
    ///
    /// A failed seed is not cached, so the next request tries again.
    pub async fn get_or_load(
        &self,
        token: &SessionToken,
        user: &User,
        store: Arc<dyn BookmarkStore>,
    ) -> Result<SharedCollection> {
        if let Some(existing) = self.inner.read().await.get(token) {
            if existing.owner == user.id {
                return Ok(existing.collection.clone());
            }
        }

        debug!("Seeding bookmark collection for session {}", token);
        let collection = BookmarkCollection::load(user.clone(), store).await?;
        Ok(self.insert_if_absent(token.clone(), collection).await)
    }

    /// Discard the cached collection for a session
    pub async fn remove(&self, token: &SessionToken) -> bool {
        self.inner.write().await.remove(token).is_some()
    }

    /// Drop collections of sessions that are expired or revoked
    ///
    /// Sessions the provider cannot check right now are kept. Returns how many
    /// collections were dropped.
    pub async fn evict_signed_out(&self, sessions: &dyn SessionProvider) -> usize {
        let cached: Vec<(SessionToken, UserId)> = self
            .inner
            .read()
            .await
            .iter()
            .map(|(token, w)| (token.clone(), w.owner))
            .collect();

        let mut dead = Vec::new();
        for (token, owner) in cached {
            match sessions.current_user(&token).await {
                Ok(Some(user)) if user.id == owner => {}
                Ok(_) => dead.push(token),
                Err(e) => warn!("Could not check session {}: {}", token, e),
            }
        }

        if dead.is_empty() {
            return 0;
        }

        let mut map = self.inner.write().await;
        let evicted = dead.iter().filter(|t| map.remove(*t).is_some()).count();
        info!("Evicted {} cached collections of ended sessions", evicted);
        evicted
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
