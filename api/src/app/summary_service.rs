//! README summary service
//!
//! Fetches a repository README, sends it to a chat-completion endpoint with
//! streaming enabled, and forwards each text delta as it arrives.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::app::aggregator::GithubSettings;
use crate::app::locale::system_instruction;
use crate::app::session::Session;
use crate::app::sse_decoder::{SseDecoder, SseRecord};
use crate::domain::entities::RepositoryKey;
use crate::domain::ports::{
    ByteStream, ChatCompletionRequest, ChatMessage, ChatRole, CompletionClient, GithubClient,
    GithubConfig,
};
use crate::error::SummaryError;

/// Lazy, finite sequence of text deltas for one summary
pub type SummaryStream = Pin<Box<dyn Stream<Item = Result<String, SummaryError>> + Send>>;

/// Generation parameters
#[derive(Debug, Clone)]
pub struct SummarySettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub readme_timeout: Duration,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            model: "gpt-4.1-mini".to_string(),
            max_tokens: 500,
            temperature: 0.7,
            readme_timeout: Duration::from_secs(5),
        }
    }
}

/// Service producing streamed README summaries
pub struct SummaryService<GC, CC>
where
    GC: GithubClient + ?Sized,
    CC: CompletionClient + ?Sized,
{
    github: Arc<GC>,
    completion: Arc<CC>,
    github_settings: GithubSettings,
    settings: SummarySettings,
}

impl<GC, CC> SummaryService<GC, CC>
where
    GC: GithubClient + ?Sized + 'static,
    CC: CompletionClient + ?Sized + 'static,
{
    pub fn new(
        github: Arc<GC>,
        completion: Arc<CC>,
        github_settings: GithubSettings,
        settings: SummarySettings,
    ) -> Self {
        Self {
            github,
            completion,
            github_settings,
            settings,
        }
    }

    /// Stream the summary deltas for `key`.
    ///
    /// The token is checked before every yield; once it is cancelled the
    /// stream stops reading and ends with `Cancelled`.
    pub fn stream(
        &self,
        config: GithubConfig,
        key: RepositoryKey,
        locale: &str,
        cancel: CancellationToken,
    ) -> SummaryStream {
        let github = self.github.clone();
        let completion = self.completion.clone();
        let settings = self.settings.clone();
        let locale = locale.to_string();

        Box::pin(async_stream::stream! {
            let mut body = match open_completion(
                github.as_ref(),
                completion.as_ref(),
                &settings,
                &config,
                &key,
                &locale,
            )
            .await
            {
                Ok(body) => body,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            let mut decoder = SseDecoder::new();
            let mut produced = false;

            'read: loop {
                let next = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break 'read,
                    next = body.next() => next,
                };

                let (records, exhausted) = match next {
                    Some(Ok(chunk)) => (decoder.feed(&chunk), false),
                    Some(Err(e)) => {
                        yield Err(SummaryError::from(e));
                        return;
                    }
                    None => (decoder.finish(), true),
                };

                for record in records {
                    match record {
                        SseRecord::Done => break 'read,
                        SseRecord::Delta(text) => {
                            if cancel.is_cancelled() {
                                break 'read;
                            }
                            produced = true;
                            yield Ok(text);
                        }
                    }
                }

                if exhausted {
                    break 'read;
                }
            }

            if cancel.is_cancelled() {
                yield Err(SummaryError::Cancelled);
            } else if !produced {
                yield Err(SummaryError::EmptyResponse);
            }
        })
    }

    /// Summarize `key` for a session, pushing every delta to `sink` in
    /// arrival order. Starting a summary abandons the session's previous one.
    ///
    /// `sink` runs while the session's summary lock is held, so it must not
    /// call back into `session`. Forward deltas to a channel instead.
    pub async fn summarize<F>(
        &self,
        session: &Session,
        key: &RepositoryKey,
        locale: &str,
        mut sink: F,
    ) -> Result<String, SummaryError>
    where
        F: FnMut(&str),
    {
        let ticket = session.summary().begin(key.clone());
        let config = self.github_settings.resolve(session);

        tracing::info!(repo = %key, locale, "Streaming README summary");

        let mut stream = self.stream(config, key.clone(), locale, ticket.token.clone());
        let mut text = String::new();

        while let Some(item) = stream.next().await {
            match item {
                Ok(delta) => {
                    if !session.deliver_summary_delta(&ticket, &delta, &mut sink) {
                        return Err(SummaryError::Cancelled);
                    }
                    text.push_str(&delta);
                }
                Err(SummaryError::Cancelled) => {
                    tracing::debug!(repo = %key, "Summary abandoned");
                    return Err(SummaryError::Cancelled);
                }
                Err(e) => {
                    tracing::warn!(repo = %key, error = %e, "Summary failed");
                    session.summary().finish(&ticket, Err(e.to_string()));
                    return Err(e);
                }
            }
        }

        session.summary().finish(&ticket, Ok(text.clone()));
        Ok(text)
    }
}

/// Fetch the README (bounded by the configured timeout) and open the
/// completion stream for it
async fn open_completion<GC, CC>(
    github: &GC,
    completion: &CC,
    settings: &SummarySettings,
    config: &GithubConfig,
    key: &RepositoryKey,
    locale: &str,
) -> Result<ByteStream, SummaryError>
where
    GC: GithubClient + ?Sized,
    CC: CompletionClient + ?Sized,
{
    let readme = tokio::time::timeout(settings.readme_timeout, github.get_readme(config, key))
        .await
        .map_err(|_| SummaryError::Timeout)??;

    if readme.trim().is_empty() {
        return Err(SummaryError::ReadmeNotFound);
    }

    let request = build_request(settings, readme, locale);
    Ok(completion.stream_chat(&request).await?)
}

fn build_request(settings: &SummarySettings, readme: String, locale: &str) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: settings.model.clone(),
        messages: vec![
            ChatMessage {
                role: ChatRole::System,
                content: system_instruction(locale).to_string(),
            },
            ChatMessage {
                role: ChatRole::User,
                content: readme,
            },
        ],
        max_tokens: settings.max_tokens,
        temperature: settings.temperature,
        stream: true,
    }
}
