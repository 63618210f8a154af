//! Repository key
//!
//! The (owner, name) pair identifying the subject under analysis.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifies a repository on the remote host
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryKey {
    pub owner: String,
    pub name: String,
}

fn host_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"github\.com/([^/?#\s]+)/([^/?#\s]+)").expect("valid host pattern")
    })
}

fn simple_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([^/\s]+)/([^/\s]+)$").expect("valid owner/name pattern"))
}

impl RepositoryKey {
    /// Build a key from already-split components, validating them
    pub fn new(owner: &str, name: &str) -> Result<Self, DomainError> {
        let owner = owner.trim();
        let name = name.trim();
        let name = name.strip_suffix(".git").unwrap_or(name);

        if owner.is_empty() || name.is_empty() || owner.contains('/') || name.contains('/') {
            return Err(DomainError::InvalidFormat(format!("{}/{}", owner, name)));
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Parse a free-form subject string.
    ///
    /// Accepts `owner/name`, `github.com/owner/name` and full URLs such as
    /// `https://github.com/owner/name.git`. Anything after the name segment
    /// of a URL (e.g. `/tree/main`) is ignored.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let input = input.trim();

        let captures = host_pattern()
            .captures(input)
            .or_else(|| simple_pattern().captures(input))
            .ok_or_else(|| DomainError::InvalidFormat(input.to_string()))?;

        Self::new(&captures[1], &captures[2])
            .map_err(|_| DomainError::InvalidFormat(input.to_string()))
    }

    #[cfg(test)]
    /// `owner/name`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl std::fmt::Display for RepositoryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl std::str::FromStr for RepositoryKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn react() -> RepositoryKey {
        RepositoryKey {
            owner: "facebook".to_string(),
            name: "react".to_string(),
        }
    }

    #[test]
    fn parse_owner_name() {
        assert_eq!(RepositoryKey::parse("facebook/react").unwrap(), react());
    }

    #[test]
    fn parse_full_url_with_git_suffix() {
        assert_eq!(
            RepositoryKey::parse("https://github.com/facebook/react.git").unwrap(),
            react()
        );
    }

    #[test]
    fn parse_host_without_scheme() {
        assert_eq!(
            RepositoryKey::parse("github.com/facebook/react").unwrap(),
            react()
        );
    }

    #[test]
    fn parse_url_with_extra_segments() {
        assert_eq!(
            RepositoryKey::parse("https://github.com/facebook/react/tree/main").unwrap(),
            react()
        );
    }

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!(RepositoryKey::parse("  facebook/react \n").unwrap(), react());
    }

    #[test]
    fn parse_rejects_bare_word() {
        assert!(matches!(
            RepositoryKey::parse("notarepo"),
            Err(DomainError::InvalidFormat(_))
        ));
    }

    #[test]
    fn parse_rejects_three_segments_without_host() {
        assert!(RepositoryKey::parse("a/b/c").is_err());
    }

    #[test]
    fn parse_rejects_empty_name_after_suffix() {
        assert!(RepositoryKey::parse("facebook/.git").is_err());
    }

    #[test]
    fn parse_rejects_empty_input() {
        assert!(RepositoryKey::parse("").is_err());
        assert!(RepositoryKey::parse("/react").is_err());
    }

    #[test]
    fn display_is_full_name() {
        assert_eq!(react().to_string(), "facebook/react");
        assert_eq!(react().full_name(), "facebook/react");
    }
}
