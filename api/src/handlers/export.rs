//! Export handlers
//!
//! Downloads of the current repository and of the comparison set.

use std::sync::Arc;

use axum::{
    http::header,
    response::{IntoResponse, Response},
    Extension,
};

use crate::app::{format_comparison, to_csv, to_json, ExportDocument, Session};
use crate::domain::entities::RepositoryKey;
use crate::error::AppError;

const COMPARISON_FILENAME: &str = "repository-comparison";

fn attachment(content_type: &str, filename: String, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

fn analysis_filename(key: Option<&RepositoryKey>, ext: &str) -> String {
    match key {
        Some(key) => format!("{}-{}-analysis.{}", key.owner, key.name, ext),
        None => format!("repository-analysis.{}", ext),
    }
}

fn current_document(
    session: &Session,
) -> Result<(ExportDocument, Option<RepositoryKey>), AppError> {
    let view = session.view();
    let document = ExportDocument::from_view(&view)?;
    Ok((document, view.subject))
}

fn serialization_error(e: serde_json::Error) -> AppError {
    AppError::Internal(format!("Failed to serialize export: {}", e))
}

/// GET /api/export/json
pub async fn export_json(
    Extension(session): Extension<Arc<Session>>,
) -> Result<Response, AppError> {
    let (document, key) = current_document(&session)?;
    let body = to_json(&document).map_err(serialization_error)?;
    Ok(attachment(
        "application/json",
        analysis_filename(key.as_ref(), "json"),
        body,
    ))
}

/// GET /api/export/csv
pub async fn export_csv(
    Extension(session): Extension<Arc<Session>>,
) -> Result<Response, AppError> {
    let (document, key) = current_document(&session)?;
    let body = to_csv(&document).map_err(serialization_error)?;
    Ok(attachment(
        "text/csv; charset=utf-8",
        analysis_filename(key.as_ref(), "csv"),
        body,
    ))
}

/// GET /api/comparison/export/json
pub async fn export_comparison_json(
    Extension(session): Extension<Arc<Session>>,
) -> Result<Response, AppError> {
    let rows = format_comparison(&session.view().comparison);
    let body = to_json(&rows).map_err(serialization_error)?;
    Ok(attachment(
        "application/json",
        format!("{}.json", COMPARISON_FILENAME),
        body,
    ))
}

/// GET /api/comparison/export/csv
pub async fn export_comparison_csv(
    Extension(session): Extension<Arc<Session>>,
) -> Result<Response, AppError> {
    let rows = format_comparison(&session.view().comparison);
    let body = to_csv(&rows).map_err(serialization_error)?;
    Ok(attachment(
        "text/csv; charset=utf-8",
        format!("{}.csv", COMPARISON_FILENAME),
        body,
    ))
}
