//! Session handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;

use crate::app::{Session, SessionView};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialRequest {
    pub token: String,
}

/// GET /api/session
pub async fn get_session(Extension(session): Extension<Arc<Session>>) -> Json<SessionView> {
    Json(session.view())
}

/// DELETE /api/session
///
/// Tear the session down; any summary stream for it stops.
pub async fn delete_session(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<Session>>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(&session.id())?;
    tracing::info!(session_id = %session.id(), "Session removed");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/credential
///
/// Store a GitHub token for this session. A blank token clears it.
pub async fn put_credential(
    Extension(session): Extension<Arc<Session>>,
    Json(req): Json<CredentialRequest>,
) -> StatusCode {
    session.set_credential(Some(req.token));
    StatusCode::NO_CONTENT
}

/// DELETE /api/credential
pub async fn delete_credential(Extension(session): Extension<Arc<Session>>) -> StatusCode {
    session.set_credential(None);
    StatusCode::NO_CONTENT
}
