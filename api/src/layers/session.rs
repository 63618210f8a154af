//! Session resolution middleware

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::AppState;

/// Header carrying the session id in both directions
pub const SESSION_HEADER: &str = "x-session-id";

fn requested_session(request: &Request<Body>) -> Option<Uuid> {
    request
        .headers()
        .get(SESSION_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| Uuid::parse_str(h.trim()).ok())
}

/// Resolve (or create) the caller's session and inject it into request
/// extensions as `Arc<Session>`. The id is echoed on the response.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let session = state.sessions.get_or_create(requested_session(&request));
    let id = session.id();

    request.extensions_mut().insert(session);

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }
    response
}
