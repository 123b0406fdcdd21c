//! REST endpoint handlers for match commentary.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness probe |
//! | `GET` | `/matches/{id}/commentary` | Newest-first entries for a match |
//! | `POST` | `/matches/{id}/commentary` | Create one entry |
//!
//! Validation always runs before the repository is touched. Extractor
//! rejections are folded into the same `400` body as schema failures so
//! clients see one error shape.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{self, ListCommentaryQuery, ValidationDetails};

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Report that the process is serving requests.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// GET /matches/{id}/commentary
// ---------------------------------------------------------------------------

/// List commentary for a match, newest first.
///
/// # Query Parameters
///
/// - `limit`: positive integer, default 100, capped at 100.
pub async fn list_commentary(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<ListCommentaryQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let match_id = match_id_from_path(path)?;

    let Query(query) =
        query.map_err(|e| ApiError::InvalidQuery(ValidationDetails::form(e.body_text())))?;
    let requested = validation::parse_list_query(&query).map_err(ApiError::InvalidQuery)?;
    let limit = validation::effective_limit(requested);

    let data = state
        .repository
        .list(match_id, limit)
        .await
        .map_err(ApiError::Fetch)?;

    tracing::debug!(%match_id, limit, count = data.len(), "Listed commentary");
    Ok(Json(serde_json::json!({ "data": data })))
}

// ---------------------------------------------------------------------------
// POST /matches/{id}/commentary
// ---------------------------------------------------------------------------

/// Create a commentary entry for a match.
///
/// The match comes from the path; a `matchId` in the body is ignored. On
/// success the configured notifier is called once with the stored entry.
/// A notifier failure is logged and does not change the response.
pub async fn create_commentary(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let match_id = match_id_from_path(path)?;

    let Json(body) =
        body.map_err(|e| ApiError::InvalidPayload(ValidationDetails::form(e.body_text())))?;
    let payload =
        validation::parse_create_body(match_id, body).map_err(ApiError::InvalidPayload)?;

    let created = state
        .repository
        .insert(payload)
        .await
        .map_err(ApiError::Create)?;

    if let Some(notifier) = &state.notifier
        && let Err(e) = notifier.broadcast(created.match_id, &created)
    {
        tracing::error!(
            error = %e,
            match_id = %created.match_id,
            id = %created.id,
            "Failed to broadcast commentary"
        );
    }

    tracing::info!(match_id = %created.match_id, id = %created.id, "Commentary created");
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "data": created })),
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Validate the `{id}` segment, mapping any failure to [`ApiError::InvalidPath`].
pub(crate) fn match_id_from_path(
    path: Result<Path<String>, PathRejection>,
) -> Result<commentary_types::MatchId, ApiError> {
    let Path(raw) =
        path.map_err(|e| ApiError::InvalidPath(ValidationDetails::form(e.body_text())))?;
    validation::parse_match_id(&raw).map_err(ApiError::InvalidPath)
}
