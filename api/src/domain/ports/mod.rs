//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod completion;
pub mod github;

pub use completion::{
    ByteStream, ChatCompletionRequest, ChatMessage, ChatRole, CompletionClient,
};
pub use github::{
    languages_from_histogram, ActivityEvent, Contributor, GithubClient, GithubConfig, Language,
    Repository,
};
