//! HTTP API for match commentary.
//!
//! This crate provides an Axum server that exposes:
//!
//! - **REST endpoints** to list (`GET`) and create (`POST`) commentary under
//!   `/matches/{id}/commentary`
//! - **`WebSocket` endpoint** (`/matches/{id}/commentary/ws`) streaming
//!   newly created entries for one match via [`tokio::sync::broadcast`]
//!
//! # Architecture
//!
//! Handlers validate input with the pure functions in [`validation`], then
//! talk to persistence only through the [`CommentaryRepository`] trait.
//! After a successful insert the optional [`CommentaryNotifier`] held in
//! [`AppState`] is called; its failures are logged and swallowed.

pub mod error;
pub mod handlers;
pub mod memory;
pub mod notifier;
pub mod repository;
pub mod router;
pub mod server;
pub mod state;
pub mod validation;
pub mod ws;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use memory::MemoryRepository;
pub use notifier::{CommentaryBroadcast, CommentaryHub, CommentaryNotifier, NotifyError};
pub use repository::{CommentaryRepository, RepositoryError};
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
