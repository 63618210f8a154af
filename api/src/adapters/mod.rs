//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod github;
pub mod openai;

pub use github::GithubClientImpl;
pub use openai::OpenAiCompletionClient;
