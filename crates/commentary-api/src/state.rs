//! Shared application state for the commentary API.
//!
//! [`AppState`] carries the injected collaborators: the repository every
//! handler reads and writes through, the optional post-insert notifier, and
//! the broadcast hub the `WebSocket` stream subscribes to.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::notifier::{CommentaryBroadcast, CommentaryHub, CommentaryNotifier};
use crate::repository::CommentaryRepository;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Commentary persistence.
    pub repository: Arc<dyn CommentaryRepository>,
    /// Hook called after each successful insert, if any.
    pub notifier: Option<Arc<dyn CommentaryNotifier>>,
    /// Live channel backing the `WebSocket` stream.
    pub hub: Arc<CommentaryHub>,
}

impl AppState {
    /// State whose notifier is the built-in broadcast hub.
    pub fn new(repository: Arc<dyn CommentaryRepository>) -> Self {
        Self::with_hub(repository, CommentaryHub::default())
    }

    /// State broadcasting through the given hub.
    pub fn with_hub(repository: Arc<dyn CommentaryRepository>, hub: CommentaryHub) -> Self {
        let hub = Arc::new(hub);
        let notifier: Arc<dyn CommentaryNotifier> = hub.clone();
        Self {
            repository,
            notifier: Some(notifier),
            hub,
        }
    }

    /// Replace the post-insert hook.
    ///
    /// The hub stays in place for `WebSocket` subscribers but only receives
    /// entries if `notifier` forwards to it.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn CommentaryNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Disable the post-insert hook entirely.
    #[must_use]
    pub fn without_notifier(mut self) -> Self {
        self.notifier = None;
        self
    }

    /// Subscribe to entries published on the hub.
    pub fn subscribe(&self) -> broadcast::Receiver<CommentaryBroadcast> {
        self.hub.subscribe()
    }
}
