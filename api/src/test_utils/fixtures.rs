//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.
//! Each fixture returns a valid record that tests can customize.

use serde_json::{json, Value};

use crate::domain::entities::RepositoryKey;
use crate::domain::ports::github::{
    ActivityEvent, Contributor, EventActor, EventPayload, EventRepo, Repository, RepositoryLicense,
    RepositoryOwner,
};

/// `facebook/react`
pub fn test_key() -> RepositoryKey {
    test_key_named("facebook", "react")
}

pub fn test_key_named(owner: &str, name: &str) -> RepositoryKey {
    RepositoryKey {
        owner: owner.to_string(),
        name: name.to_string(),
    }
}

/// Create a test repository (`facebook/react`)
pub fn test_repository() -> Repository {
    test_repository_named("facebook", "react", 10)
}

/// Create a test repository with a specific id
pub fn test_repository_with_id(id: i64) -> Repository {
    test_repository_named("facebook", &format!("react-{}", id), id)
}

pub fn test_repository_named(owner: &str, name: &str, id: i64) -> Repository {
    Repository {
        id,
        name: name.to_string(),
        full_name: format!("{}/{}", owner, name),
        owner: RepositoryOwner {
            login: owner.to_string(),
            avatar_url: format!("https://avatars.example/{}", owner),
            html_url: format!("https://github.com/{}", owner),
        },
        html_url: format!("https://github.com/{}/{}", owner, name),
        description: Some("A JavaScript library for building user interfaces".to_string()),
        created_at: "2013-05-24T16:15:54Z".to_string(),
        updated_at: "2024-01-15T10:00:00Z".to_string(),
        pushed_at: Some("2024-01-15T09:00:00Z".to_string()),
        stargazers_count: 100,
        watchers_count: 100,
        forks_count: 20,
        open_issues_count: 5,
        language: Some("JavaScript".to_string()),
        topics: vec!["ui".to_string(), "frontend".to_string()],
        default_branch: "main".to_string(),
        license: Some(RepositoryLicense {
            key: "mit".to_string(),
            name: "MIT License".to_string(),
            url: None,
        }),
        subscribers_count: Some(7),
        network_count: Some(20),
        size: Some(1024),
    }
}

/// Repository record as the GitHub API returns it
pub fn repository_json(id: i64, owner: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "full_name": format!("{}/{}", owner, name),
        "owner": {
            "login": owner,
            "avatar_url": format!("https://avatars.example/{}", owner),
            "html_url": format!("https://github.com/{}", owner)
        },
        "html_url": format!("https://github.com/{}/{}", owner, name),
        "description": null,
        "created_at": "2013-05-24T16:15:54Z",
        "updated_at": "2024-01-15T10:00:00Z",
        "pushed_at": "2024-01-15T09:00:00Z",
        "stargazers_count": 100,
        "watchers_count": 100,
        "forks_count": 20,
        "open_issues_count": 5,
        "language": "JavaScript",
        "topics": null,
        "default_branch": "main",
        "license": null,
        "size": 1024
    })
}

/// Create a test contributor
pub fn test_contributor(login: &str) -> Contributor {
    Contributor {
        login: login.to_string(),
        id: 1,
        avatar_url: format!("https://avatars.example/{}", login),
        html_url: format!("https://github.com/{}", login),
        contributions: 10,
        kind: "User".to_string(),
    }
}

/// Create a test event of the given type with an empty payload
pub fn test_event(kind: &str) -> ActivityEvent {
    ActivityEvent {
        id: "1".to_string(),
        kind: kind.to_string(),
        actor: EventActor {
            login: "octocat".to_string(),
            avatar_url: String::new(),
            url: String::new(),
        },
        repo: EventRepo {
            id: 10,
            name: "facebook/react".to_string(),
            url: String::new(),
        },
        payload: EventPayload::default(),
        created_at: "2024-01-15T10:00:00Z".to_string(),
        public: true,
    }
}
