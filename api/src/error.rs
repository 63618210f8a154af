//! Unified error types for the RepoLens API
//!
//! This module defines error types for each layer:
//! - `DomainError`: Core business logic errors (parsing, comparison rules)
//! - `GithubError`: GitHub API client errors
//! - `CompletionError`: Text-generation API client errors
//! - `SummaryError`: README summary stream errors
//! - `AppError`: Application layer errors (wraps the others for HTTP responses)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Guidance attached to rate-limit failures
pub const RATE_LIMIT_HINT: &str =
    "GitHub API rate limit exceeded. Please add a GitHub token to increase the limit.";

/// Domain layer errors - pure business logic errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid repository format: {0}. Use owner/repo or a full GitHub URL")]
    InvalidFormat(String),

    #[error("Repository {0} is already in the comparison list")]
    AlreadyInComparison(String),

    #[error("You can compare up to {0} repositories. Remove one to add another")]
    ComparisonFull(usize),

    #[error("No repository is currently loaded")]
    NoCurrentRepository,

    #[error("Session not found: {0}")]
    SessionNotFound(String),
}

/// GitHub API client errors
#[derive(Debug, Error)]
pub enum GithubError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{}", RATE_LIMIT_HINT)]
    RateLimited,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request timed out")]
    Timeout,

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

/// Text-generation API client errors
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Completion service error: {status} - {message}")]
    Upstream { status: u16, message: String },
}

/// README summary errors
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("README not found in this repository")]
    ReadmeNotFound,

    #[error("Request timed out. Please try again")]
    Timeout,

    #[error("No content received from analysis service")]
    EmptyResponse,

    #[error("{}", RATE_LIMIT_HINT)]
    RateLimited,

    #[error("GitHub error: {0}")]
    Github(GithubError),

    #[error("{0}")]
    Completion(#[from] CompletionError),

    #[error("Request was cancelled")]
    Cancelled,
}

impl From<GithubError> for SummaryError {
    fn from(e: GithubError) -> Self {
        match e {
            GithubError::NotFound(_) => SummaryError::ReadmeNotFound,
            GithubError::Timeout => SummaryError::Timeout,
            GithubError::RateLimited => SummaryError::RateLimited,
            other => SummaryError::Github(other),
        }
    }
}

/// Application layer errors - used by HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("GitHub error: {0}")]
    Github(#[from] GithubError),

    #[error("Summary error: {0}")]
    Summary(#[from] SummaryError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body for JSON responses
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

fn github_status(e: &GithubError) -> (StatusCode, &'static str, Option<String>) {
    match e {
        GithubError::NotFound(what) => (
            StatusCode::NOT_FOUND,
            "Not found",
            Some(format!("{} not found", what)),
        ),
        GithubError::RateLimited => (
            StatusCode::TOO_MANY_REQUESTS,
            "Rate limited",
            Some(RATE_LIMIT_HINT.to_string()),
        ),
        GithubError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "Timeout", None),
        GithubError::Api { status, message } => {
            tracing::error!("GitHub API error: {} - {}", status, message);
            (StatusCode::BAD_GATEWAY, "GitHub service error", Some(message.clone()))
        }
        _ => {
            tracing::error!("GitHub error: {}", e);
            (StatusCode::BAD_GATEWAY, "GitHub service error", None)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Domain(e @ DomainError::InvalidFormat(_)) => (
                StatusCode::BAD_REQUEST,
                "Invalid format",
                Some(e.to_string()),
            ),
            AppError::Domain(e @ DomainError::AlreadyInComparison(_))
            | AppError::Domain(e @ DomainError::ComparisonFull(_))
            | AppError::Domain(e @ DomainError::NoCurrentRepository) => {
                (StatusCode::CONFLICT, "Conflict", Some(e.to_string()))
            }
            AppError::Domain(e @ DomainError::SessionNotFound(_)) => {
                (StatusCode::NOT_FOUND, "Not found", Some(e.to_string()))
            }
            AppError::Github(e) => github_status(e),
            AppError::Summary(e) => match e {
                SummaryError::ReadmeNotFound => {
                    (StatusCode::NOT_FOUND, "Not found", Some(e.to_string()))
                }
                SummaryError::Timeout => {
                    (StatusCode::GATEWAY_TIMEOUT, "Timeout", Some(e.to_string()))
                }
                SummaryError::RateLimited => (
                    StatusCode::TOO_MANY_REQUESTS,
                    "Rate limited",
                    Some(e.to_string()),
                ),
                SummaryError::EmptyResponse | SummaryError::Cancelled => (
                    StatusCode::BAD_GATEWAY,
                    "Summary unavailable",
                    Some(e.to_string()),
                ),
                SummaryError::Github(inner) => github_status(inner),
                SummaryError::Completion(inner) => {
                    tracing::error!("Completion error: {}", inner);
                    (StatusCode::BAD_GATEWAY, "Analysis service error", None)
                }
            },
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "Bad request", Some(msg.clone()))
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            details,
        });

        (status, body).into_response()
    }
}
