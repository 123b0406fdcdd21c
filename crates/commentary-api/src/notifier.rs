//! Post-insert notification of newly created commentary.
//!
//! [`CommentaryNotifier`] is the hook the create handler calls after a
//! successful insert. [`CommentaryHub`] is the built-in implementation: it
//! fans entries out over a [`tokio::sync::broadcast`] channel that the
//! `WebSocket` stream subscribes to.

use commentary_types::{CommentaryEntry, MatchId};
use tokio::sync::broadcast;

/// Default capacity of the live commentary channel.
///
/// A subscriber that falls further behind than this receives
/// [`broadcast::error::RecvError::Lagged`] and skips to the newest entry.
pub const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// A notifier failed to deliver an entry.
#[derive(Debug, thiserror::Error)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

/// Hook invoked once per created entry.
///
/// Failures are logged by the caller and never reach the HTTP client.
pub trait CommentaryNotifier: Send + Sync {
    /// Announce `entry`, which belongs to `match_id`.
    fn broadcast(&self, match_id: MatchId, entry: &CommentaryEntry) -> Result<(), NotifyError>;
}

/// One entry published on the live channel.
#[derive(Debug, Clone)]
pub struct CommentaryBroadcast {
    /// Match the entry belongs to, used by subscribers to filter.
    pub match_id: MatchId,
    /// The created entry.
    pub entry: CommentaryEntry,
}

/// Broadcast channel carrying every created entry to live subscribers.
#[derive(Debug, Clone)]
pub struct CommentaryHub {
    tx: broadcast::Sender<CommentaryBroadcast>,
}

impl CommentaryHub {
    /// Create a hub whose channel buffers `capacity` messages.
    ///
    /// A zero capacity is raised to one, the minimum the channel accepts.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to all future entries.
    pub fn subscribe(&self) -> broadcast::Receiver<CommentaryBroadcast> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for CommentaryHub {
    fn default() -> Self {
        Self::new(DEFAULT_BROADCAST_CAPACITY)
    }
}

impl CommentaryNotifier for CommentaryHub {
    fn broadcast(&self, match_id: MatchId, entry: &CommentaryEntry) -> Result<(), NotifyError> {
        let message = CommentaryBroadcast {
            match_id,
            entry: entry.clone(),
        };
        // send only fails when nobody is subscribed, which is normal.
        let receivers = self.tx.send(message).unwrap_or(0);
        tracing::debug!(%match_id, id = %entry.id, receivers, "Commentary broadcast sent");
        Ok(())
    }
}
