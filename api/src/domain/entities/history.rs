//! Recently analyzed repositories

use serde::Serialize;

use crate::domain::ports::Repository;

/// Maximum number of repositories kept in history
pub const HISTORY_CAP: usize = 10;

/// Most-recent-first list of resolved repositories, unique by id
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<Repository>,
}

impl History {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `repo` to the front, dropping any older copy and the overflow
    pub fn record(&mut self, repo: Repository) {
        self.entries.retain(|r| r.id != repo.id);
        self.entries.insert(0, repo);
        self.entries.truncate(HISTORY_CAP);
    }

    pub fn entries(&self) -> &[Repository] {
        &self.entries
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_repository_with_id;

    #[test]
    fn duplicate_moves_to_front() {
        let mut history = History::new();
        history.record(test_repository_with_id(1));
        history.record(test_repository_with_id(2));
        history.record(test_repository_with_id(1));

        assert_eq!(history.len(), 2);
        assert_eq!(history.entries()[0].id, 1);
        assert_eq!(history.entries()[1].id, 2);
    }

    #[test]
    fn eleventh_entry_evicts_oldest() {
        let mut history = History::new();
        for id in 1..=11 {
            history.record(test_repository_with_id(id));
        }

        assert_eq!(history.len(), HISTORY_CAP);
        assert_eq!(history.entries()[0].id, 11);
        assert!(history.entries().iter().all(|r| r.id != 1));
    }
}
