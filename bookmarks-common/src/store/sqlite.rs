//! SQLite-backed Bookmark Store

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

use super::BookmarkStore;
use crate::{time, Bookmark, BookmarkId, Error, NewBookmark, Result, UserId};

/// Row shape shared by every bookmark query
type BookmarkRow = (String, String, String, String, String);

#[derive(Clone)]
pub struct SqliteBookmarkStore {
    pool: SqlitePool,
}

impl SqliteBookmarkStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_bookmark(row: BookmarkRow) -> Result<Bookmark> {
    let (id, user_id, title, url, created_at) = row;
    Ok(Bookmark {
        id: id
            .parse()
            .map_err(|e| Error::Internal(format!("Invalid bookmark id {:?}: {}", id, e)))?,
        owner: user_id
            .parse()
            .map_err(|e| Error::Internal(format!("Invalid user id {:?}: {}", user_id, e)))?,
        title,
        url,
        created_at: time::from_storage(&created_at)?,
    })
}

#[async_trait]
impl BookmarkStore for SqliteBookmarkStore {
    async fn select(&self, owner: UserId) -> Result<Vec<Bookmark>> {
        let rows = sqlx::query_as::<_, BookmarkRow>(
            r#"
            SELECT id, user_id, title, url, created_at
            FROM bookmarks
            WHERE user_id = ?
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(owner.to_string())
        .fetch_all(&self.pool)
        .await?;

        debug!("Selected {} bookmarks for {}", rows.len(), owner);

        rows.into_iter().map(row_to_bookmark).collect()
    }

    async fn insert(&self, bookmark: NewBookmark) -> Result<Bookmark> {
        let record = Bookmark {
            id: BookmarkId::new(),
            owner: bookmark.owner(),
            title: bookmark.title().to_string(),
            url: bookmark.url().to_string(),
            created_at: time::now(),
        };

        sqlx::query(
            "INSERT INTO bookmarks (id, user_id, title, url, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(record.id.to_string())
        .bind(record.owner.to_string())
        .bind(&record.title)
        .bind(&record.url)
        .bind(time::to_storage(&record.created_at))
        .execute(&self.pool)
        .await?;

        debug!("Inserted bookmark {} for {}", record.id, record.owner);

        Ok(record)
    }

    async fn delete_by_id(&self, caller: UserId, id: BookmarkId) -> Result<()> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(caller.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            debug!("Delete of bookmark {} by {} matched no rows", id, caller);
        }

        Ok(())
    }
}
