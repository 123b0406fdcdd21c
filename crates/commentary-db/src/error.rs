//! Error types for the data layer.
//!
//! Store and pool operations return [`DbError`]. Its display text is what
//! the HTTP layer reports as `details` when a query fails.

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The connection settings were rejected before any connection was
    /// attempted, e.g. a `DATABASE_URL` that does not parse.
    #[error("Configuration error: {0}")]
    Config(String),
}
