//! README summary handler
//!
//! Streams the summary as server-sent events: one `delta` event per text
//! fragment in arrival order, then a single `done` (full text) or `error`.
//! Event payloads are JSON strings so whitespace and newlines survive.

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    response::sse::{Event, KeepAlive, Sse},
    Extension,
};
use futures::Stream;
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::app::{preferred_locale, Session};
use crate::domain::entities::RepositoryKey;
use crate::error::AppError;
use crate::AppState;

type SummarySseStream = Pin<Box<dyn Stream<Item = Result<Event, Infallible>> + Send>>;

const DEFAULT_LOCALE: &str = "en";

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// Overrides `Accept-Language`
    pub locale: Option<String>,
}

fn text_event(name: &str, text: &str) -> Event {
    let payload = serde_json::to_string(text).unwrap_or_else(|_| "\"\"".into());
    Event::default().event(name).data(payload)
}

fn request_locale(query: SummaryQuery, headers: &HeaderMap) -> String {
    query
        .locale
        .filter(|l| !l.trim().is_empty())
        .or_else(|| {
            headers
                .get(header::ACCEPT_LANGUAGE)
                .and_then(|v| v.to_str().ok())
                .and_then(preferred_locale)
        })
        .unwrap_or_else(|| DEFAULT_LOCALE.to_string())
}

/// GET /api/summary/:owner/:name
///
/// Starting a summary abandons the session's previous one. If the client
/// disconnects, the upstream read stops.
pub async fn stream_summary(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<Session>>,
    Path((owner, name)): Path<(String, String)>,
    Query(query): Query<SummaryQuery>,
    headers: HeaderMap,
) -> Result<Sse<SummarySseStream>, AppError> {
    let key = RepositoryKey::new(&owner, &name)?;
    let locale = request_locale(query, &headers);

    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();

    tokio::spawn(async move {
        let deltas = tx.clone();
        let summarize = state
            .summaries
            .summarize(&session, &key, &locale, |delta| {
                let _ = deltas.send(text_event("delta", delta));
            });

        let result = tokio::select! {
            result = summarize => result,
            _ = tx.closed() => {
                tracing::debug!(repo = %key, "Summary client disconnected");
                return;
            }
        };

        let last = match result {
            Ok(text) => text_event("done", &text),
            Err(e) => text_event("error", &e.to_string()),
        };
        let _ = tx.send(last);
    });

    let stream: SummarySseStream = Box::pin(async_stream::stream! {
        while let Some(event) = rx.recv().await {
            yield Ok(event);
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}
