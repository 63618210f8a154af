//! Chat-completion client implementation

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;

use crate::domain::ports::{ByteStream, ChatCompletionRequest, CompletionClient};
use crate::error::CompletionError;

/// Streaming client for `POST /v1/chat/completions`
pub struct OpenAiCompletionClient {
    http: Client,
    base_url: String,
    api_token: String,
}

impl OpenAiCompletionClient {
    pub fn new(base_url: String, api_token: String) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/v1{}", self.base_url, path)
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn stream_chat(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ByteStream, CompletionError> {
        let resp = self
            .http
            .post(self.api_url("/chat/completions"))
            .bearer_auth(&self.api_token)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(CompletionError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!(model = %request.model, "Completion stream opened");

        let body = resp
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(CompletionError::from));

        Ok(Box::pin(body))
    }
}
