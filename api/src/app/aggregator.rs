//! Repository aggregator
//!
//! Resolves a subject string to a repository key and runs the four metadata
//! fetches concurrently. Each fetch writes its own slot as soon as it
//! completes; results for a subject that has since been replaced are
//! discarded.

use std::sync::Arc;

use chrono::{Months, Utc};
use serde::Serialize;

use crate::app::session::{Session, SessionView, SlotUpdate};
use crate::domain::entities::{ComparableRepository, RepositoryKey, SlotError};
use crate::domain::ports::{GithubClient, GithubConfig, Repository};
use crate::error::{DomainError, GithubError};

/// Result of one aggregation run
#[derive(Debug, Clone, Serialize)]
pub struct FetchOutcome {
    pub key: RepositoryKey,
    /// True when another subject became active before every slot resolved
    pub superseded: bool,
    pub view: SessionView,
}

/// Where GitHub requests go and which token to fall back on
#[derive(Debug, Clone)]
pub struct GithubSettings {
    pub base_url: String,
    pub default_token: Option<String>,
}

impl GithubSettings {
    /// Resolve the request config for one operation: the session token
    /// first, then the configured default, then anonymous.
    pub fn resolve(&self, session: &Session) -> GithubConfig {
        GithubConfig::new(
            self.base_url.clone(),
            session.credential().or_else(|| self.default_token.clone()),
        )
    }
}

/// Service orchestrating repository fetches for a session
pub struct Aggregator<GC>
where
    GC: GithubClient + ?Sized,
{
    github: Arc<GC>,
    settings: GithubSettings,
}

impl<GC> Aggregator<GC>
where
    GC: GithubClient + ?Sized,
{
    pub fn new(github: Arc<GC>, settings: GithubSettings) -> Self {
        Self { github, settings }
    }

    /// Parse a free-form subject and aggregate it.
    ///
    /// Fails with `InvalidFormat` before any request is made.
    pub async fn fetch_repository_data(
        &self,
        session: &Session,
        input: &str,
    ) -> Result<FetchOutcome, DomainError> {
        let key = RepositoryKey::parse(input)?;
        Ok(self.load(session, key).await)
    }

    /// Aggregate an already-parsed subject
    pub async fn load(&self, session: &Session, key: RepositoryKey) -> FetchOutcome {
        let generation = session.begin_fetch(&key);
        let config = self.settings.resolve(session);

        tracing::info!(repo = %key, generation, "Loading repository");

        let github = &self.github;
        let (config, key_ref) = (&config, &key);
        let apply = |update: SlotUpdate| {
            let kind = update.kind();
            let applied = session.apply(generation, update);
            if !applied {
                tracing::debug!(repo = %key_ref, slot = %kind, "Dropping stale result");
            }
            applied
        };

        let (repository, languages, contributors, activity) = tokio::join!(
            async {
                let result = github.get_repository(config, key_ref).await;
                apply(SlotUpdate::Repository(slot_result(key_ref, "repository", result)))
            },
            async {
                let result = github.get_languages(config, key_ref).await;
                apply(SlotUpdate::Languages(slot_result(key_ref, "languages", result)))
            },
            async {
                let result = github.get_contributors(config, key_ref).await;
                apply(SlotUpdate::Contributors(slot_result(key_ref, "contributors", result)))
            },
            async {
                let result = github.get_recent_activity(config, key_ref).await;
                apply(SlotUpdate::Activity(slot_result(key_ref, "activity", result)))
            },
        );

        let superseded = !(repository && languages && contributors && activity);

        FetchOutcome {
            key,
            superseded,
            view: session.view(),
        }
    }

    /// Add the current repository to the comparison set
    pub fn add_to_comparison(&self, session: &Session) -> Result<ComparableRepository, DomainError> {
        let record = session.analysis().add_current_to_comparison()?;
        tracing::info!(repo = %record.full_name, "Added to comparison");
        Ok(record)
    }

    pub fn remove_from_comparison(&self, session: &Session, id: i64) {
        if session.analysis().remove_from_comparison(id) {
            tracing::info!(id, "Removed from comparison");
        }
    }

    pub fn clear_comparison(&self, session: &Session) {
        session.analysis().clear_comparison();
    }

    /// Return to the empty search state
    pub fn reset(&self, session: &Session) {
        session.clear_subject();
    }

    /// Free-text repository search (first page, most starred first)
    pub async fn search(
        &self,
        session: &Session,
        query: &str,
    ) -> Result<Vec<Repository>, GithubError> {
        let config = self.settings.resolve(session);
        self.github.search_repositories(&config, query).await
    }

    /// Popular repositories created within the last month
    pub async fn trending(&self, session: &Session) -> Result<Vec<Repository>, GithubError> {
        let today = Utc::now().date_naive();
        let since = today.checked_sub_months(Months::new(1)).unwrap_or(today);
        let config = self.settings.resolve(session);
        self.github
            .trending_repositories(&config, &since.format("%Y-%m-%d").to_string())
            .await
    }
}

fn slot_result<T>(
    key: &RepositoryKey,
    slot: &str,
    result: Result<T, GithubError>,
) -> Result<T, SlotError> {
    result.map_err(|e| {
        tracing::warn!(repo = %key, slot, error = %e, "Fetch failed");
        SlotError::from(&e)
    })
}
