//! Queries against the `commentary` table.
//!
//! Rows are append-only: this store exposes a filtered, newest-first read
//! and a single-row insert. `id` and `created_at` are assigned by the
//! database defaults and returned via `RETURNING`.

use chrono::{DateTime, Utc};
use commentary_types::{CommentaryEntry, CommentaryId, MatchId, NewCommentary};
use sqlx::PgPool;

use crate::error::DbError;

/// Column list shared by every query that returns full rows.
const COLUMNS: &str = "id, match_id, minute, sequence, period, event_type, actor, team, message, metadata, tags, created_at";

/// Operations on the `commentary` table.
#[derive(Clone)]
pub struct CommentaryStore {
    pool: PgPool,
}

impl CommentaryStore {
    /// Create a store bound to a connection pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch up to `limit` entries for a match, newest first.
    ///
    /// Entries created in the same instant are ordered by descending `id`
    /// so repeated reads return a stable sequence.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn list_for_match(
        &self,
        match_id: MatchId,
        limit: u32,
    ) -> Result<Vec<CommentaryRow>, DbError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM commentary WHERE match_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2"
        );
        let rows = sqlx::query_as::<_, CommentaryRow>(&sql)
            .bind(match_id.into_inner())
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(%match_id, limit, count = rows.len(), "Fetched commentary");
        Ok(rows)
    }

    /// Insert one entry and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails, including a
    /// foreign-key violation when the match does not exist.
    pub async fn insert_entry(&self, entry: &NewCommentary) -> Result<CommentaryRow, DbError> {
        let sql = format!(
            "INSERT INTO commentary (match_id, minute, sequence, period, event_type, actor, team, message, metadata, tags)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        let metadata = entry.metadata.clone().map(serde_json::Value::Object);

        let row = sqlx::query_as::<_, CommentaryRow>(&sql)
            .bind(entry.match_id.into_inner())
            .bind(entry.minute)
            .bind(entry.sequence)
            .bind(&entry.period)
            .bind(&entry.event_type)
            .bind(entry.actor.as_deref())
            .bind(entry.team.as_deref())
            .bind(&entry.message)
            .bind(metadata)
            .bind(entry.tags.as_deref())
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(match_id = row.match_id, id = row.id, "Inserted commentary");
        Ok(row)
    }
}

/// A row from the `commentary` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentaryRow {
    /// Auto-incremented entry ID.
    pub id: i64,
    /// Referenced match.
    pub match_id: i64,
    /// Match minute.
    pub minute: i32,
    /// Same-minute ordering.
    pub sequence: i32,
    /// Period label.
    pub period: String,
    /// Event category.
    pub event_type: String,
    /// Actor attribution.
    pub actor: Option<String>,
    /// Team attribution.
    pub team: Option<String>,
    /// Commentary text.
    pub message: String,
    /// JSONB payload.
    pub metadata: Option<serde_json::Value>,
    /// `TEXT[]` labels.
    pub tags: Option<Vec<String>>,
    /// Insert timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<CommentaryRow> for CommentaryEntry {
    fn from(row: CommentaryRow) -> Self {
        // Inserts only ever write JSON objects.
        let metadata = match row.metadata {
            Some(serde_json::Value::Object(map)) => Some(map),
            _ => None,
        };

        Self {
            id: CommentaryId(row.id),
            match_id: MatchId(row.match_id),
            minute: row.minute,
            sequence: row.sequence,
            period: row.period,
            event_type: row.event_type,
            actor: row.actor,
            team: row.team,
            message: row.message,
            metadata,
            tags: row.tags,
            created_at: row.created_at,
        }
    }
}
