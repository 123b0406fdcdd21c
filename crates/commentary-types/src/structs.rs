//! Commentary records and the insert payload that creates them.
//!
//! [`CommentaryEntry`] is the stored, server-stamped form returned by both
//! endpoints. [`NewCommentary`] is the validated set of fields a client
//! supplies plus the match key taken from the request path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{CommentaryId, MatchId};

/// Free-form structured payload attached to an entry.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// One commentary event tied to a point in a match timeline.
///
/// Entries are immutable once stored: there is no update or delete path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CommentaryEntry {
    /// Server-assigned identifier.
    pub id: CommentaryId,
    /// The match this entry belongs to.
    pub match_id: MatchId,
    /// Match minute the event happened in.
    pub minute: i32,
    /// Position among entries sharing the same minute.
    pub sequence: i32,
    /// Match period label, e.g. `1H`.
    pub period: String,
    /// Event category, e.g. `goal`.
    pub event_type: String,
    /// Player or official the event is attributed to.
    pub actor: Option<String>,
    /// Team the event is attributed to.
    pub team: Option<String>,
    /// Human-readable commentary text.
    pub message: String,
    /// Free-form structured payload.
    #[ts(type = "Record<string, unknown> | null")]
    pub metadata: Option<Metadata>,
    /// Labels attached to the entry.
    pub tags: Option<Vec<String>>,
    /// Server-assigned creation time, the listing sort key.
    pub created_at: DateTime<Utc>,
}

/// Fields required to insert a commentary entry.
///
/// `match_id` always comes from the request path; any match key in the
/// client body never reaches this struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct NewCommentary {
    /// The match this entry belongs to.
    pub match_id: MatchId,
    /// Match minute the event happened in.
    pub minute: i32,
    /// Position among entries sharing the same minute.
    pub sequence: i32,
    /// Match period label.
    pub period: String,
    /// Event category.
    pub event_type: String,
    /// Optional actor attribution.
    pub actor: Option<String>,
    /// Optional team attribution.
    pub team: Option<String>,
    /// Commentary text.
    pub message: String,
    /// Optional structured payload.
    #[ts(type = "Record<string, unknown> | null")]
    pub metadata: Option<Metadata>,
    /// Optional labels.
    pub tags: Option<Vec<String>>,
}

impl NewCommentary {
    /// Stamp this payload with a server identifier and creation time.
    ///
    /// Used by stores that assign keys in-process rather than in SQL.
    pub fn into_entry(self, id: CommentaryId, created_at: DateTime<Utc>) -> CommentaryEntry {
        CommentaryEntry {
            id,
            match_id: self.match_id,
            minute: self.minute,
            sequence: self.sequence,
            period: self.period,
            event_type: self.event_type,
            actor: self.actor,
            team: self.team,
            message: self.message,
            metadata: self.metadata,
            tags: self.tags,
            created_at,
        }
    }
}
