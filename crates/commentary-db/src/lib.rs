//! `PostgreSQL` data layer for the match commentary service.
//!
//! # Modules
//!
//! - [`postgres`] -- Connection pool, configuration, and migrations
//! - [`commentary_store`] -- Newest-first listing and single-row inserts
//! - [`error`] -- Shared error types

pub mod commentary_store;
pub mod error;
pub mod postgres;

// Re-export primary types for convenience.
pub use commentary_store::{CommentaryRow, CommentaryStore};
pub use error::DbError;
pub use postgres::{PostgresConfig, PostgresPool};
