//! Shared type definitions for the match commentary service.
//!
//! Types defined here are used by the data layer and the HTTP layer and
//! flow downstream to `TypeScript` via `ts-rs` for live-feed clients.
//!
//! # Modules
//!
//! - [`ids`] -- Typed wrappers for match and commentary keys
//! - [`structs`] -- Stored entries and the insert payload

pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use ids::{CommentaryId, MatchId};
pub use structs::{CommentaryEntry, Metadata, NewCommentary};

