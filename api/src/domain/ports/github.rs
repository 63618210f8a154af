//! GitHub client port trait
//!
//! Defines the interface for reading repository metadata from the GitHub
//! REST API. Only the first page of every list endpoint is requested.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::entities::RepositoryKey;
use crate::error::GithubError;

/// Helper to deserialize null as default (empty vec, etc.)
fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

/// Per-operation request configuration.
///
/// Resolved once per operation (session token, then default token, then
/// anonymous) and passed explicitly to every client call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubConfig {
    pub base_url: String,
    pub credential: Option<String>,
}

impl GithubConfig {
    pub fn new(base_url: impl Into<String>, credential: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credential: credential.filter(|c| !c.trim().is_empty()),
        }
    }
}

/// Repository owner summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub html_url: String,
}

/// Repository license
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryLicense {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// GitHub repository record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: i64,
    pub name: String,
    pub full_name: String,
    pub owner: RepositoryOwner,
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub pushed_at: Option<String>,
    #[serde(default)]
    pub stargazers_count: i64,
    #[serde(default)]
    pub watchers_count: i64,
    #[serde(default)]
    pub forks_count: i64,
    #[serde(default)]
    pub open_issues_count: i64,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub topics: Vec<String>,
    #[serde(default)]
    pub default_branch: String,
    #[serde(default)]
    pub license: Option<RepositoryLicense>,
    #[serde(default)]
    pub subscribers_count: Option<i64>,
    #[serde(default)]
    pub network_count: Option<i64>,
    #[serde(default)]
    pub size: Option<i64>,
}

/// One entry of the language histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub name: String,
    pub bytes: u64,
    pub percentage: f64,
}

/// Repository contributor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    pub login: String,
    pub id: i64,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub contributions: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Actor of a public event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventActor {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub url: String,
}

/// Repository reference inside a public event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRepo {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// Commit listed in a push event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCommit {
    pub sha: String,
    #[serde(default)]
    pub message: String,
}

/// Pull request or issue referenced by an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventItem {
    pub number: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub state: String,
}

/// Comment referenced by an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventComment {
    #[serde(default)]
    pub body: String,
}

/// Event payload (only the fields the dashboard reads)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(rename = "ref", default)]
    pub ref_name: Option<String>,
    #[serde(default)]
    pub ref_type: Option<String>,
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub commits: Option<Vec<EventCommit>>,
    #[serde(default)]
    pub pull_request: Option<EventItem>,
    #[serde(default)]
    pub issue: Option<EventItem>,
    #[serde(default)]
    pub comment: Option<EventComment>,
}

/// Recent public event on a repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub actor: EventActor,
    pub repo: EventRepo,
    #[serde(default)]
    pub payload: EventPayload,
    pub created_at: String,
    #[serde(default)]
    pub public: bool,
}

/// Port trait for GitHub API operations
#[async_trait]
pub trait GithubClient: Send + Sync {
    /// Fetch the repository record
    async fn get_repository(
        &self,
        config: &GithubConfig,
        key: &RepositoryKey,
    ) -> Result<Repository, GithubError>;

    /// Fetch the language histogram, with percentages, largest first
    async fn get_languages(
        &self,
        config: &GithubConfig,
        key: &RepositoryKey,
    ) -> Result<Vec<Language>, GithubError>;

    /// Fetch the first page of contributors
    async fn get_contributors(
        &self,
        config: &GithubConfig,
        key: &RepositoryKey,
    ) -> Result<Vec<Contributor>, GithubError>;

    /// Fetch recent public events (bounded page size)
    async fn get_recent_activity(
        &self,
        config: &GithubConfig,
        key: &RepositoryKey,
    ) -> Result<Vec<ActivityEvent>, GithubError>;

    /// Fetch the raw README document
    async fn get_readme(
        &self,
        config: &GithubConfig,
        key: &RepositoryKey,
    ) -> Result<String, GithubError>;

    /// Search repositories by free text, most starred first
    async fn search_repositories(
        &self,
        config: &GithubConfig,
        query: &str,
    ) -> Result<Vec<Repository>, GithubError>;

    /// Repositories created since `since` (YYYY-MM-DD) with more than 100 stars
    async fn trending_repositories(
        &self,
        config: &GithubConfig,
        since: &str,
    ) -> Result<Vec<Repository>, GithubError>;
}

/// Compute percentages from a raw `{language: bytes}` histogram.
///
/// Entries are ordered by byte count, largest first; ties keep name order.
pub fn languages_from_histogram<I>(histogram: I) -> Vec<Language>
where
    I: IntoIterator<Item = (String, u64)>,
{
    let mut languages: Vec<Language> = histogram
        .into_iter()
        .map(|(name, bytes)| Language {
            name,
            bytes,
            percentage: 0.0,
        })
        .collect();

    let total: u64 = languages.iter().map(|l| l.bytes).sum();
    for lang in &mut languages {
        lang.percentage = if total > 0 {
            lang.bytes as f64 / total as f64 * 100.0
        } else {
            0.0
        };
    }

    languages.sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.name.cmp(&b.name)));
    languages
}
