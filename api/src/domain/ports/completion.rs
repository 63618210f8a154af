//! Text-generation port trait
//!
//! A chat-completion endpoint that answers with a byte stream of
//! newline-delimited `data: <json|[DONE]>` records.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::error::CompletionError;

/// Raw response body, chunked as the transport delivers it
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, CompletionError>> + Send>>;

/// Chat message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Streaming chat-completion request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub stream: bool,
}

/// Port trait for the text-generation service
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Start a streaming completion and hand back the response body
    async fn stream_chat(&self, request: &ChatCompletionRequest)
        -> Result<ByteStream, CompletionError>;
}
