//! Comparison set
//!
//! Up to three condensed repository records shown side by side.

use serde::{Deserialize, Serialize};

use crate::domain::ports::Repository;
use crate::error::DomainError;

/// Maximum number of repositories in the comparison set
pub const COMPARISON_CAP: usize = 3;

/// Condensed repository record used for comparisons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparableRepository {
    pub id: i64,
    pub name: String,
    pub full_name: String,
    pub stars: i64,
    pub forks: i64,
    pub issues: i64,
    pub language: Option<String>,
    /// Contributor count at the time the record was added
    pub contributors: usize,
    pub last_update: String,
    pub created_at: String,
}

impl ComparableRepository {
    pub fn from_repository(repo: &Repository, contributors: usize) -> Self {
        Self {
            id: repo.id,
            name: repo.name.clone(),
            full_name: repo.full_name.clone(),
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            issues: repo.open_issues_count,
            language: repo.language.clone(),
            contributors,
            last_update: repo.updated_at.clone(),
            created_at: repo.created_at.clone(),
        }
    }
}

/// Insertion-ordered set of comparable repositories, unique by id
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ComparisonSet {
    entries: Vec<ComparableRepository>,
}

impl ComparisonSet {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, repo: ComparableRepository) -> Result<(), DomainError> {
        if self.contains(repo.id) {
            return Err(DomainError::AlreadyInComparison(repo.full_name));
        }
        if self.entries.len() >= COMPARISON_CAP {
            return Err(DomainError::ComparisonFull(COMPARISON_CAP));
        }
        self.entries.push(repo);
        Ok(())
    }

    /// Remove by id; returns whether an entry was removed
    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|r| r.id != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, id: i64) -> bool {
        self.entries.iter().any(|r| r.id == id)
    }

    pub fn entries(&self) -> &[ComparableRepository] {
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

    fn comparable(id: i64) -> ComparableRepository {
        ComparableRepository::from_repository(&test_repository_with_id(id), 4)
    }

    #[test]
    fn fourth_entry_is_rejected() {
        let mut set = ComparisonSet::new();
        for id in 1..=3 {
            set.add(comparable(id)).unwrap();
        }

        assert_eq!(
            set.add(comparable(4)),
            Err(DomainError::ComparisonFull(COMPARISON_CAP))
        );
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn duplicate_is_rejected() {
        let mut set = ComparisonSet::new();
        set.add(comparable(1)).unwrap();

        assert!(matches!(
            set.add(comparable(1)),
            Err(DomainError::AlreadyInComparison(_))
        ));
    }

    #[test]
    fn duplicate_checked_before_capacity() {
        let mut set = ComparisonSet::new();
        for id in 1..=3 {
            set.add(comparable(id)).unwrap();
        }

        assert!(matches!(
            set.add(comparable(2)),
            Err(DomainError::AlreadyInComparison(_))
        ));
    }

    #[test]
    fn remove_and_clear() {
        let mut set = ComparisonSet::new();
        set.add(comparable(1)).unwrap();
        set.add(comparable(2)).unwrap();

        assert!(set.remove(1));
        assert!(!set.remove(1));
        assert_eq!(set.len(), 1);

        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn condensed_record_copies_counts() {
        let record = comparable(9);
        assert_eq!(record.id, 9);
        assert_eq!(record.contributors, 4);
        assert_eq!(record.stars, 100);
    }
}
