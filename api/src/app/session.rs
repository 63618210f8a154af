//! Session state store
//!
//! One `Session` per dashboard visitor: the aggregated view, history,
//! comparison set, summary stream state and the GitHub credential. A session
//! is created on the first request and lives until it is torn down or has
//! been idle longer than the store allows. Every mutation runs under the
//! session's locks, which are never held across an `.await`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::domain::entities::{
    ComparableRepository, ComparisonSet, FetchSlot, History, RepositoryKey, SlotError, SlotKind,
    StreamState,
};
use crate::domain::ports::{ActivityEvent, Contributor, Language, Repository};
use crate::error::DomainError;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A completed fetch for one slot
#[derive(Debug)]
pub enum SlotUpdate {
    Repository(Result<Repository, SlotError>),
    Languages(Result<Vec<Language>, SlotError>),
    Contributors(Result<Vec<Contributor>, SlotError>),
    Activity(Result<Vec<ActivityEvent>, SlotError>),
}

impl SlotUpdate {
    pub fn kind(&self) -> SlotKind {
        match self {
            SlotUpdate::Repository(_) => SlotKind::Repository,
            SlotUpdate::Languages(_) => SlotKind::Languages,
            SlotUpdate::Contributors(_) => SlotKind::Contributors,
            SlotUpdate::Activity(_) => SlotKind::Activity,
        }
    }
}

/// Aggregated view of the current subject plus the session-wide collections
#[derive(Debug, Default)]
pub struct AnalysisState {
    generation: u64,
    active_key: Option<RepositoryKey>,
    repository: FetchSlot<Repository>,
    languages: FetchSlot<Vec<Language>>,
    contributors: FetchSlot<Vec<Contributor>>,
    activity: FetchSlot<Vec<ActivityEvent>>,
    history: History,
    comparison: ComparisonSet,
}

impl AnalysisState {
    /// Make `key` the active subject and put all four slots in loading.
    /// Returns the generation that results must carry to be accepted.
    pub fn begin(&mut self, key: RepositoryKey) -> u64 {
        self.generation += 1;
        self.active_key = Some(key);
        self.repository = FetchSlot::Loading;
        self.languages = FetchSlot::Loading;
        self.contributors = FetchSlot::Loading;
        self.activity = FetchSlot::Loading;
        self.generation
    }

    /// Drop the current subject; history and comparison are kept
    pub fn clear_subject(&mut self) {
        self.generation += 1;
        self.active_key = None;
        self.repository = FetchSlot::Idle;
        self.languages = FetchSlot::Idle;
        self.contributors = FetchSlot::Idle;
        self.activity = FetchSlot::Idle;
    }

    /// Apply a fetch result. Results from an abandoned generation are dropped.
    pub fn apply(&mut self, generation: u64, update: SlotUpdate) -> bool {
        if generation != self.generation {
            return false;
        }

        match update {
            SlotUpdate::Repository(result) => {
                let resolved = result.as_ref().ok().cloned();
                let applied = self.repository.resolve(result);
                if applied {
                    if let Some(repo) = resolved {
                        self.history.record(repo);
                    }
                }
                applied
            }
            SlotUpdate::Languages(result) => self.languages.resolve(result),
            SlotUpdate::Contributors(result) => self.contributors.resolve(result),
            SlotUpdate::Activity(result) => self.activity.resolve(result),
        }
    }

    pub fn active_key(&self) -> Option<&RepositoryKey> {
        self.active_key.as_ref()
    }

    pub fn repository(&self) -> &FetchSlot<Repository> {
        &self.repository
    }

    pub fn languages(&self) -> &FetchSlot<Vec<Language>> {
        &self.languages
    }

    pub fn contributors(&self) -> &FetchSlot<Vec<Contributor>> {
        &self.contributors
    }

    pub fn activity(&self) -> &FetchSlot<Vec<ActivityEvent>> {
        &self.activity
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn comparison(&self) -> &ComparisonSet {
        &self.comparison
    }

    /// Condense the current repository into the comparison set
    pub fn add_current_to_comparison(&mut self) -> Result<ComparableRepository, DomainError> {
        let repo = self
            .repository
            .ready()
            .ok_or(DomainError::NoCurrentRepository)?;
        let contributors = self.contributors.ready().map(Vec::len).unwrap_or(0);

        let record = ComparableRepository::from_repository(repo, contributors);
        self.comparison.add(record.clone())?;
        Ok(record)
    }

    pub fn remove_from_comparison(&mut self, id: i64) -> bool {
        self.comparison.remove(id)
    }

    pub fn clear_comparison(&mut self) {
        self.comparison.clear();
    }
}

/// Handle for one summary stream; stale once the session moves on
#[derive(Debug, Clone)]
pub struct SummaryTicket {
    pub generation: u64,
    pub token: CancellationToken,
}

/// Summary stream bookkeeping for the current subject
#[derive(Debug, Default)]
pub struct SummaryTracker {
    generation: u64,
    subject: Option<RepositoryKey>,
    token: CancellationToken,
    state: StreamState,
}

impl SummaryTracker {
    /// Abandon whatever stream is in flight and start a new one for `key`
    pub fn begin(&mut self, key: RepositoryKey) -> SummaryTicket {
        self.token.cancel();
        self.generation += 1;
        self.subject = Some(key);
        self.token = CancellationToken::new();
        self.state = StreamState::Idle;
        SummaryTicket {
            generation: self.generation,
            token: self.token.clone(),
        }
    }

    /// Reset to idle when the subject changes. A stream for the same
    /// subject keeps running.
    pub fn switch_subject(&mut self, key: Option<&RepositoryKey>) {
        if self.subject.as_ref() == key && key.is_some() {
            return;
        }
        self.token.cancel();
        self.generation += 1;
        self.subject = None;
        self.token = CancellationToken::new();
        self.state = StreamState::Idle;
    }

    pub fn is_current(&self, ticket: &SummaryTicket) -> bool {
        ticket.generation == self.generation && !ticket.token.is_cancelled()
    }

    /// Record a delta for a current ticket; returns false if the ticket is stale
    pub fn push(&mut self, ticket: &SummaryTicket, delta: &str) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.state.push(delta);
        true
    }

    pub fn finish(&mut self, ticket: &SummaryTicket, outcome: Result<String, String>) {
        if !self.is_current(ticket) {
            return;
        }
        self.state = match outcome {
            Ok(text) => StreamState::Done(text),
            Err(message) => StreamState::Failed(message),
        };
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }
}

/// Serializable snapshot of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub subject: Option<RepositoryKey>,
    pub repository: FetchSlot<Repository>,
    pub languages: FetchSlot<Vec<Language>>,
    pub contributors: FetchSlot<Vec<Contributor>>,
    pub activity: FetchSlot<Vec<ActivityEvent>>,
    pub history: Vec<Repository>,
    pub comparison: Vec<ComparableRepository>,
    pub summary: StreamState,
    pub has_credential: bool,
}

/// Per-visitor state store
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    last_seen: Mutex<Instant>,
    credential: Mutex<Option<String>>,
    analysis: Mutex<AnalysisState>,
    summary: Mutex<SummaryTracker>,
}

impl Session {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            last_seen: Mutex::new(Instant::now()),
            credential: Mutex::new(None),
            analysis: Mutex::new(AnalysisState::default()),
            summary: Mutex::new(SummaryTracker::default()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Mark the session as used now
    pub fn touch(&self) {
        *lock(&self.last_seen) = Instant::now();
    }

    pub fn last_seen(&self) -> Instant {
        *lock(&self.last_seen)
    }

    pub fn analysis(&self) -> MutexGuard<'_, AnalysisState> {
        lock(&self.analysis)
    }

    pub fn summary(&self) -> MutexGuard<'_, SummaryTracker> {
        lock(&self.summary)
    }

    pub fn credential(&self) -> Option<String> {
        lock(&self.credential).clone()
    }

    pub fn set_credential(&self, token: Option<String>) {
        *lock(&self.credential) = token.filter(|t| !t.trim().is_empty());
    }

    /// Start fetching `key`: one transition resets every slot, and a summary
    /// for a different subject is abandoned.
    pub fn begin_fetch(&self, key: &RepositoryKey) -> u64 {
        let generation = self.analysis().begin(key.clone());
        self.summary().switch_subject(Some(key));
        generation
    }

    pub fn apply(&self, generation: u64, update: SlotUpdate) -> bool {
        self.analysis().apply(generation, update)
    }

    /// Go back to the empty search state
    pub fn clear_subject(&self) {
        self.analysis().clear_subject();
        self.summary().switch_subject(None);
    }

    /// Forward a summary delta to `sink` if the ticket is still current.
    ///
    /// The check, the state update and the sink call happen under one lock,
    /// so nothing reaches the sink once the stream has been abandoned. The
    /// sink runs with the summary lock held and must not call back into this
    /// session (`view`, `summary`, `clear_subject`, ...).
    pub fn deliver_summary_delta<F>(&self, ticket: &SummaryTicket, delta: &str, sink: &mut F) -> bool
    where
        F: FnMut(&str),
    {
        let mut summary = self.summary();
        if !summary.push(ticket, delta) {
            return false;
        }
        sink(delta);
        true
    }

    pub fn view(&self) -> SessionView {
        let has_credential = self.credential().is_some();
        let summary = self.summary().state().clone();
        let analysis = self.analysis();

        SessionView {
            session_id: self.id,
            subject: analysis.active_key().cloned(),
            repository: analysis.repository().clone(),
            languages: analysis.languages().clone(),
            contributors: analysis.contributors().clone(),
            activity: analysis.activity().clone(),
            history: analysis.history().entries().to_vec(),
            comparison: analysis.comparison().entries().to_vec(),
            summary,
            has_credential,
        }
    }
}

/// Bounds on how many sessions the store keeps and for how long
#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    /// Sessions unused for this long are dropped by `purge_idle`
    pub idle_ttl: Duration,
    /// Creating a session beyond this evicts the least recently used one
    pub max_sessions: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            idle_ttl: Duration::from_secs(30 * 60),
            max_sessions: 10_000,
        }
    }
}

/// All live sessions, keyed by id
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Arc<Session>>>,
    limits: SessionLimits,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: SessionLimits) -> Self {
        Self {
            sessions: RwLock::default(),
            limits,
        }
    }

    /// Look up a session, creating a fresh one when the id is missing or unknown
    pub fn get_or_create(&self, id: Option<Uuid>) -> Arc<Session> {
        if let Some(id) = id {
            let sessions = self.sessions.read().unwrap_or_else(|p| p.into_inner());
            if let Some(session) = sessions.get(&id) {
                session.touch();
                return session.clone();
            }
        }

        let session = Arc::new(Session::new(Uuid::new_v4()));
        let mut sessions = self.sessions.write().unwrap_or_else(|p| p.into_inner());
        if sessions.len() >= self.limits.max_sessions {
            self.evict(&mut sessions);
        }
        sessions.insert(session.id(), session.clone());
        tracing::debug!(session_id = %session.id(), "Session created");
        session
    }

    /// Tear a session down, abandoning any summary stream it owns
    pub fn remove(&self, id: &Uuid) -> Result<(), DomainError> {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .remove(id)
            .ok_or_else(|| DomainError::SessionNotFound(id.to_string()))?;
        removed.clear_subject();
        tracing::debug!(session_id = %id, "Session removed");
        Ok(())
    }

    /// Drop every session idle for at least `idle_ttl`; returns how many went
    pub fn purge_idle(&self) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(|p| p.into_inner());
        Self::drop_idle(&mut sessions, self.limits.idle_ttl)
    }

    /// Periodically purge idle sessions for as long as the runtime lives
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let purged = self.purge_idle();
                if purged > 0 {
                    tracing::info!(purged, remaining = self.len(), "Purged idle sessions");
                }
            }
        })
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(|p| p.into_inner()).len()
    }

    /// Make room for one more session: idle ones go first, then the least
    /// recently used.
    fn evict(&self, sessions: &mut HashMap<Uuid, Arc<Session>>) {
        if Self::drop_idle(sessions, self.limits.idle_ttl) > 0
            && sessions.len() < self.limits.max_sessions
        {
            return;
        }
        while sessions.len() >= self.limits.max_sessions.max(1) {
            let Some(oldest) = sessions
                .values()
                .min_by_key(|s| s.last_seen())
                .map(|s| s.id())
            else {
                break;
            };
            if let Some(session) = sessions.remove(&oldest) {
                session.clear_subject();
                tracing::debug!(session_id = %oldest, "Evicted least recently used session");
            }
        }
    }

    fn drop_idle(sessions: &mut HashMap<Uuid, Arc<Session>>, ttl: Duration) -> usize {
        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|_, session| {
            let keep = now.saturating_duration_since(session.last_seen()) < ttl;
            if !keep {
                session.clear_subject();
            }
            keep
        });
        before - sessions.len()
    }
}
