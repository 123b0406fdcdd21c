//! In-process commentary store.
//!
//! Keeps every entry in a `Vec` behind a [`RwLock`]. Used by the test
//! suite and by the server when no database URL is configured.

use async_trait::async_trait;
use chrono::Utc;
use commentary_types::{CommentaryEntry, CommentaryId, MatchId, NewCommentary};
use tokio::sync::RwLock;

use crate::repository::{CommentaryRepository, RepositoryError};

#[derive(Debug, Default)]
struct Inner {
    last_id: i64,
    entries: Vec<CommentaryEntry>,
}

/// [`CommentaryRepository`] backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    inner: RwLock<Inner>,
}

impl MemoryRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries across all matches.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// Whether the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }
}

#[async_trait]
impl CommentaryRepository for MemoryRepository {
    async fn list(
        &self,
        match_id: MatchId,
        limit: u32,
    ) -> Result<Vec<CommentaryEntry>, RepositoryError> {
        let inner = self.inner.read().await;

        let mut entries: Vec<CommentaryEntry> = inner
            .entries
            .iter()
            .filter(|e| e.match_id == match_id)
            .cloned()
            .collect();

        // Same ordering as the SQL query: newest first, id breaks ties.
        entries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        entries.truncate(usize::try_from(limit).unwrap_or(usize::MAX));

        Ok(entries)
    }

    async fn insert(&self, entry: NewCommentary) -> Result<CommentaryEntry, RepositoryError> {
        let mut inner = self.inner.write().await;

        let id = inner
            .last_id
            .checked_add(1)
            .ok_or_else(|| RepositoryError::Backend(String::from("commentary id space exhausted")))?;
        inner.last_id = id;

        let created = entry.into_entry(CommentaryId(id), Utc::now());
        inner.entries.push(created.clone());

        tracing::debug!(match_id = %created.match_id, id, "Stored commentary in memory");
        Ok(created)
    }
}
