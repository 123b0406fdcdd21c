//! Persistence seam for the commentary endpoints.
//!
//! Handlers only see [`CommentaryRepository`]. Production wires in the
//! `PostgreSQL`-backed [`CommentaryStore`]; tests and database-less runs use
//! [`MemoryRepository`](crate::memory::MemoryRepository).

use async_trait::async_trait;
use commentary_db::{CommentaryStore, DbError};
use commentary_types::{CommentaryEntry, MatchId, NewCommentary};

/// Errors surfaced by a repository. All of them become `500` responses.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The `PostgreSQL` layer failed.
    #[error(transparent)]
    Db(#[from] DbError),

    /// A non-database backend failed.
    #[error("{0}")]
    Backend(String),
}

/// Ordered, filtered reads and single-row inserts of commentary.
#[async_trait]
pub trait CommentaryRepository: Send + Sync {
    /// Up to `limit` entries for `match_id`, newest `created_at` first.
    async fn list(
        &self,
        match_id: MatchId,
        limit: u32,
    ) -> Result<Vec<CommentaryEntry>, RepositoryError>;

    /// Persist one entry, assigning its `id` and `created_at`.
    async fn insert(&self, entry: NewCommentary) -> Result<CommentaryEntry, RepositoryError>;
}

#[async_trait]
impl CommentaryRepository for CommentaryStore {
    async fn list(
        &self,
        match_id: MatchId,
        limit: u32,
    ) -> Result<Vec<CommentaryEntry>, RepositoryError> {
        let rows = self.list_for_match(match_id, limit).await?;
        Ok(rows.into_iter().map(CommentaryEntry::from).collect())
    }

    async fn insert(&self, entry: NewCommentary) -> Result<CommentaryEntry, RepositoryError> {
        let row = self.insert_entry(&entry).await?;
        Ok(CommentaryEntry::from(row))
    }
}
