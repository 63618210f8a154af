//! Fetch slots
//!
//! Each of the four aggregated resources resolves independently into its
//! own slot.

use serde::{Deserialize, Serialize};

use crate::error::GithubError;

/// The four independently resolving data categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    Repository,
    Languages,
    Contributors,
    Activity,
}

impl std::fmt::Display for SlotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotKind::Repository => write!(f, "repository"),
            SlotKind::Languages => write!(f, "languages"),
            SlotKind::Contributors => write!(f, "contributors"),
            SlotKind::Activity => write!(f, "activity"),
        }
    }
}

/// Failure category of a slot, so clients can render targeted guidance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotErrorKind {
    NotFound,
    RateLimited,
    Timeout,
    Other,
}

/// Why a slot failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotError {
    pub kind: SlotErrorKind,
    pub message: String,
}

impl From<&GithubError> for SlotError {
    fn from(e: &GithubError) -> Self {
        let kind = match e {
            GithubError::NotFound(_) => SlotErrorKind::NotFound,
            GithubError::RateLimited => SlotErrorKind::RateLimited,
            GithubError::Timeout => SlotErrorKind::Timeout,
            _ => SlotErrorKind::Other,
        };
        let message = match e {
            GithubError::Api { message, .. } if !message.is_empty() => message.clone(),
            other => other.to_string(),
        };
        Self { kind, message }
    }
}

/// State of one resource: idle → loading → ready | failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "lowercase")]
pub enum FetchSlot<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(SlotError),
}

impl<T> Default for FetchSlot<T> {
    fn default() -> Self {
        FetchSlot::Idle
    }
}

impl<T> FetchSlot<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchSlot::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            FetchSlot::Ready(value) => Some(value),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn error(&self) -> Option<&SlotError> {
        match self {
            FetchSlot::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Apply a completed fetch. Only a loading slot accepts a result;
    /// returns whether the result was applied.
    pub fn resolve(&mut self, result: Result<T, SlotError>) -> bool {
        if !self.is_loading() {
            return false;
        }
        *self = match result {
            Ok(value) => FetchSlot::Ready(value),
            Err(e) => FetchSlot::Failed(e),
        };
        true
    }
}
