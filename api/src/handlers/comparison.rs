//! Comparison handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use crate::app::Session;
use crate::domain::entities::ComparableRepository;
use crate::error::AppError;
use crate::AppState;

/// GET /api/comparison
pub async fn list_comparison(
    Extension(session): Extension<Arc<Session>>,
) -> Json<Vec<ComparableRepository>> {
    Json(session.view().comparison)
}

/// POST /api/comparison
///
/// Add the current repository to the comparison set.
pub async fn add_to_comparison(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<Session>>,
) -> Result<(StatusCode, Json<ComparableRepository>), AppError> {
    let record = state.aggregator.add_to_comparison(&session)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /api/comparison/:id
pub async fn remove_from_comparison(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<Session>>,
    Path(id): Path<i64>,
) -> StatusCode {
    state.aggregator.remove_from_comparison(&session, id);
    StatusCode::NO_CONTENT
}

/// DELETE /api/comparison
pub async fn clear_comparison(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<Session>>,
) -> StatusCode {
    state.aggregator.clear_comparison(&session);
    StatusCode::NO_CONTENT
}
