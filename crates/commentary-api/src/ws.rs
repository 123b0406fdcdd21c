//! `WebSocket` stream of newly created commentary for one match.
//!
//! Clients connect to `GET /matches/{id}/commentary/ws` and receive a JSON
//! text frame `{"type": "commentary", "data": <entry>}` for every entry
//! created for that match while they are connected. Entries for other
//! matches are filtered out server-side.
//!
//! If a client falls behind, lagged messages are skipped and the client
//! resumes from the most recent entry.

use std::sync::Arc;

use axum::extract::rejection::PathRejection;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use commentary_types::{CommentaryEntry, MatchId};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::handlers::match_id_from_path;
use crate::notifier::CommentaryBroadcast;
use crate::state::AppState;

/// Frame pushed to live clients.
#[derive(Debug, serde::Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum LiveFrame<'a> {
    /// A newly created entry.
    Commentary(&'a CommentaryEntry),
}

/// Validate the match id, then upgrade to a `WebSocket` streaming that
/// match's new entries.
///
/// # Route
///
/// `GET /matches/{id}/commentary/ws`
pub async fn commentary_stream(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let match_id = match match_id_from_path(path) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    match ws {
        Ok(ws) => ws.on_upgrade(move |socket| handle_ws(socket, state, match_id)),
        Err(rejection) => rejection.into_response(),
    }
}

/// Forward hub messages for `match_id` until either side hangs up.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>, match_id: MatchId) {
    debug!(%match_id, "Commentary stream client connected");

    let mut rx = state.subscribe();

    loop {
        tokio::select! {
            result = rx.recv() => {
                match hub_step(match_id, result) {
                    HubStep::Forward(json) => {
                        if socket.send(Message::Text(json.into())).await.is_err() {
                            debug!(%match_id, "Commentary stream client disconnected (send failed)");
                            return;
                        }
                    }
                    HubStep::Skip => {}
                    HubStep::Stop => return,
                }
            }
            msg = socket.recv() => {
                match client_step(match_id, msg) {
                    ClientStep::Reply(reply) => {
                        if socket.send(reply).await.is_err() {
                            return;
                        }
                    }
                    ClientStep::Ignore => {}
                    ClientStep::Hangup => return,
                }
            }
        }
    }
}

/// Outcome of one receive from the hub.
#[derive(Debug, PartialEq, Eq)]
enum HubStep {
    /// Send this text frame.
    Forward(String),
    /// Nothing for this client.
    Skip,
    /// The hub is gone.
    Stop,
}

/// Decide what a `match_id` subscriber does with one hub receive.
///
/// Entries for other matches are dropped and a lagged receiver carries on
/// from whatever the channel still holds.
fn hub_step(match_id: MatchId, result: Result<CommentaryBroadcast, RecvError>) -> HubStep {
    match result {
        Ok(broadcast) if broadcast.match_id == match_id => {
            match serde_json::to_string(&LiveFrame::Commentary(&broadcast.entry)) {
                Ok(json) => HubStep::Forward(json),
                Err(e) => {
                    warn!("Failed to serialize commentary frame: {e}");
                    HubStep::Skip
                }
            }
        }
        Ok(_) => HubStep::Skip,
        Err(RecvError::Lagged(n)) => {
            debug!(%match_id, skipped = n, "Commentary stream client lagged, skipping ahead");
            HubStep::Skip
        }
        Err(RecvError::Closed) => {
            debug!("Commentary hub closed, shutting down stream");
            HubStep::Stop
        }
    }
}

/// Outcome of one receive from the client.
#[derive(Debug, PartialEq, Eq)]
enum ClientStep {
    /// Send this frame back.
    Reply(Message),
    /// Nothing to do.
    Ignore,
    /// The client is gone.
    Hangup,
}

fn client_step(match_id: MatchId, msg: Option<Result<Message, axum::Error>>) -> ClientStep {
    match msg {
        Some(Ok(Message::Close(_))) | None => {
            debug!(%match_id, "Commentary stream client disconnected");
            ClientStep::Hangup
        }
        Some(Ok(Message::Ping(data))) => ClientStep::Reply(Message::Pong(data)),
        Some(Err(e)) => {
            debug!(%match_id, "Commentary stream error: {e}");
            ClientStep::Hangup
        }
        // Clients have nothing to say on this stream.
        Some(Ok(_)) => ClientStep::Ignore,
    }
}
