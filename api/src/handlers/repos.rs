//! Repository handlers
//!
//! Endpoints that choose the active subject and run the aggregation.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::app::{FetchOutcome, Session, SessionView};
use crate::domain::entities::RepositoryKey;
use crate::domain::ports::Repository;
use crate::error::AppError;
use crate::AppState;

/// Request to analyze a free-form subject
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// `owner/name` or any URL containing `github.com/owner/name`
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /
///
/// Return to the empty search state. History and comparison are kept.
pub async fn index(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<Session>>,
) -> Json<SessionView> {
    state.aggregator.reset(&session);
    Json(session.view())
}

/// GET /:owner/:name
///
/// Deep link: aggregate the named repository.
pub async fn deep_link(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<Session>>,
    Path((owner, name)): Path<(String, String)>,
) -> Result<Json<FetchOutcome>, AppError> {
    let key = RepositoryKey::new(&owner, &name)?;
    Ok(Json(state.aggregator.load(&session, key).await))
}

/// POST /api/analyze
pub async fn analyze(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<Session>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<FetchOutcome>, AppError> {
    let outcome = state
        .aggregator
        .fetch_repository_data(&session, &req.query)
        .await?;
    Ok(Json(outcome))
}

/// GET /api/search?q=
pub async fn search(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<Session>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Repository>>, AppError> {
    let q = query.q.trim();
    if q.is_empty() {
        return Err(AppError::BadRequest("Search query is required".to_string()));
    }
    Ok(Json(state.aggregator.search(&session, q).await?))
}

/// GET /api/trending
pub async fn trending(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<Session>>,
) -> Result<Json<Vec<Repository>>, AppError> {
    Ok(Json(state.aggregator.trending(&session).await?))
}
