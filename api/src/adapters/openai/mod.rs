//! OpenAI-compatible adapter
//!
//! Streaming chat-completion client for any OpenAI-compatible endpoint.

pub mod client;

pub use client::OpenAiCompletionClient;
