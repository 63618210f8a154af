//! Mock implementations of port traits
//!
//! In-memory implementations that can be configured per test. They record
//! what they were asked for so tests can verify behavior.

use async_trait::async_trait;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::domain::entities::{RepositoryKey, SlotKind};
use crate::domain::ports::github::EventCommit;
use crate::domain::ports::{
    languages_from_histogram, ActivityEvent, ByteStream, ChatCompletionRequest, CompletionClient,
    Contributor, GithubClient, GithubConfig, Language, Repository,
};
use crate::error::{CompletionError, GithubError};
use crate::test_utils::fixtures::{test_contributor, test_event, test_repository_named};

// ============================================================================
// Mock GitHub Client
// ============================================================================

/// How a configured slot fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    NotFound,
    RateLimited,
    Timeout,
}

impl FailureMode {
    fn error(self, key: &RepositoryKey) -> GithubError {
        match self {
            FailureMode::NotFound => GithubError::NotFound(key.full_name()),
            FailureMode::RateLimited => GithubError::RateLimited,
            FailureMode::Timeout => GithubError::Timeout,
        }
    }
}

#[derive(Default)]
pub struct MockGithubClient {
    /// Every call, as `<operation>:<argument>`
    pub calls: Arc<RwLock<Vec<String>>>,
    /// Credential seen by every call
    pub credentials: Arc<RwLock<Vec<Option<String>>>>,
    repositories: Arc<RwLock<HashMap<String, Repository>>>,
    readmes: Arc<RwLock<HashMap<String, String>>>,
    readme_delay: Option<Duration>,
    failures: Arc<RwLock<HashMap<SlotKind, FailureMode>>>,
    /// Calls for these repositories wait for a permit
    gates: Arc<RwLock<HashMap<String, Arc<Semaphore>>>>,
}

impl MockGithubClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure a repository to exist
    pub fn with_repository(self, owner: &str, name: &str, id: i64) -> Self {
        let repo = test_repository_named(owner, name, id);
        self.repositories
            .write()
            .unwrap()
            .insert(repo.full_name.clone(), repo);
        self
    }

    pub fn with_readme(self, owner: &str, name: &str, readme: &str) -> Self {
        self.readmes
            .write()
            .unwrap()
            .insert(format!("{}/{}", owner, name), readme.to_string());
        self
    }

    pub fn with_readme_delay(mut self, delay: Duration) -> Self {
        self.readme_delay = Some(delay);
        self
    }

    /// Make one slot fail for every repository
    pub fn failing(self, slot: SlotKind, mode: FailureMode) -> Self {
        self.failures.write().unwrap().insert(slot, mode);
        self
    }

    /// Hold every call for `full_name` until the returned semaphore gets a
    /// permit. Permits are handed back after each call.
    pub fn gate(&self, full_name: &str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates
            .write()
            .unwrap()
            .insert(full_name.to_string(), gate.clone());
        gate
    }

    async fn enter(&self, config: &GithubConfig, call: String, key: Option<&RepositoryKey>) {
        self.calls.write().unwrap().push(call);
        self.credentials
            .write()
            .unwrap()
            .push(config.credential.clone());

        let gate = key.and_then(|k| self.gates.read().unwrap().get(&k.full_name()).cloned());
        if let Some(gate) = gate {
            let _permit = gate.acquire().await;
        }
    }

    fn lookup(&self, slot: SlotKind, key: &RepositoryKey) -> Result<Repository, GithubError> {
        if let Some(mode) = self.failures.read().unwrap().get(&slot) {
            return Err(mode.error(key));
        }
        self.repositories
            .read()
            .unwrap()
            .get(&key.full_name())
            .cloned()
            .ok_or_else(|| GithubError::NotFound(key.full_name()))
    }
}

#[async_trait]
impl GithubClient for MockGithubClient {
    async fn get_repository(
        &self,
        config: &GithubConfig,
        key: &RepositoryKey,
    ) -> Result<Repository, GithubError> {
        self.enter(config, format!("repository:{}", key), Some(key)).await;
        self.lookup(SlotKind::Repository, key)
    }

    async fn get_languages(
        &self,
        config: &GithubConfig,
        key: &RepositoryKey,
    ) -> Result<Vec<Language>, GithubError> {
        self.enter(config, format!("languages:{}", key), Some(key)).await;
        self.lookup(SlotKind::Languages, key)?;
        Ok(languages_from_histogram(vec![
            ("JavaScript".to_string(), 900),
            ("HTML".to_string(), 100),
        ]))
    }

    async fn get_contributors(
        &self,
        config: &GithubConfig,
        key: &RepositoryKey,
    ) -> Result<Vec<Contributor>, GithubError> {
        self.enter(config, format!("contributors:{}", key), Some(key)).await;
        self.lookup(SlotKind::Contributors, key)?;
        Ok(vec![test_contributor("alice"), test_contributor("bob")])
    }

    async fn get_recent_activity(
        &self,
        config: &GithubConfig,
        key: &RepositoryKey,
    ) -> Result<Vec<ActivityEvent>, GithubError> {
        self.enter(config, format!("activity:{}", key), Some(key)).await;
        self.lookup(SlotKind::Activity, key)?;

        let mut push = test_event("PushEvent");
        push.payload.commits = Some(vec![EventCommit {
            sha: "abc123".to_string(),
            message: "Fix typo".to_string(),
        }]);
        Ok(vec![push, test_event("WatchEvent")])
    }

    async fn get_readme(
        &self,
        config: &GithubConfig,
        key: &RepositoryKey,
    ) -> Result<String, GithubError> {
        self.enter(config, format!("readme:{}", key), Some(key)).await;
        if let Some(delay) = self.readme_delay {
            tokio::time::sleep(delay).await;
        }
        self.readmes
            .read()
            .unwrap()
            .get(&key.full_name())
            .cloned()
            .ok_or_else(|| GithubError::NotFound(format!("README for {}", key)))
    }

    async fn search_repositories(
        &self,
        config: &GithubConfig,
        query: &str,
    ) -> Result<Vec<Repository>, GithubError> {
        self.enter(config, format!("search:{}", query), None).await;
        let mut found: Vec<Repository> = self
            .repositories
            .read()
            .unwrap()
            .values()
            .filter(|r| r.full_name.contains(query))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count));
        Ok(found)
    }

    async fn trending_repositories(
        &self,
        config: &GithubConfig,
        since: &str,
    ) -> Result<Vec<Repository>, GithubError> {
        self.enter(config, format!("trending:{}", since), None).await;
        Ok(self.repositories.read().unwrap().values().cloned().collect())
    }
}

// ============================================================================
// Mock Completion Client
// ============================================================================

enum Script {
    Chunks(Vec<Vec<u8>>),
    Channel(Mutex<Option<UnboundedReceiver<Result<Vec<u8>, CompletionError>>>>),
    Failing,
}

/// Completion client that replays scripted response chunks
pub struct MockCompletionClient {
    script: Script,
    /// Every request received
    pub requests: Arc<RwLock<Vec<ChatCompletionRequest>>>,
}

impl MockCompletionClient {
    /// Respond with exactly these chunks, then end the body
    pub fn with_chunks(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            script: Script::Chunks(chunks),
            requests: Arc::default(),
        }
    }

    /// Respond with whatever the test pushes into the sender (chunks or
    /// transport errors); the body ends when the sender is dropped
    pub fn channel() -> (Self, UnboundedSender<Result<Vec<u8>, CompletionError>>) {
        let (tx, rx) = mpsc::unbounded();
        let client = Self {
            script: Script::Channel(Mutex::new(Some(rx))),
            requests: Arc::default(),
        };
        (client, tx)
    }

    /// Reject every request with a 500
    pub fn failing() -> Self {
        Self {
            script: Script::Failing,
            requests: Arc::default(),
        }
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn stream_chat(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ByteStream, CompletionError> {
        self.requests.write().unwrap().push(request.clone());

        match &self.script {
            Script::Chunks(chunks) => Ok(Box::pin(futures::stream::iter(
                chunks.clone().into_iter().map(Ok),
            ))),
            Script::Channel(rx) => match rx.lock().unwrap().take() {
                Some(rx) => Ok(Box::pin(rx)),
                None => Ok(Box::pin(futures::stream::empty())),
            },
            Script::Failing => Err(CompletionError::Upstream {
                status: 500,
                message: "Mock failure".to_string(),
            }),
        }
    }
}
