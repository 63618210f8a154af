//! RepoLens API Server
//!
//! A repository dashboard backend: aggregates GitHub repository metadata,
//! keeps per-session history and comparisons, and streams README summaries.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::HeaderName,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod config;
mod domain;
mod error;
mod handlers;
mod layers;

#[cfg(test)]
mod test_utils;


use adapters::{GithubClientImpl, OpenAiCompletionClient};
use app::{
    Aggregator, GithubSettings, SessionLimits, SessionStore, SummaryService, SummarySettings,
};
use config::Config;
use domain::ports::{CompletionClient, GithubClient};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator<dyn GithubClient>>,
    pub summaries: Arc<SummaryService<dyn GithubClient, dyn CompletionClient>>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(
        github: Arc<dyn GithubClient>,
        completion: Arc<dyn CompletionClient>,
        github_settings: GithubSettings,
        summary_settings: SummarySettings,
    ) -> Self {
        Self {
            aggregator: Arc::new(Aggregator::new(github.clone(), github_settings.clone())),
            summaries: Arc::new(SummaryService::new(
                github,
                completion,
                github_settings,
                summary_settings,
            )),
            sessions: Arc::new(SessionStore::new()),
        }
    }

    pub fn with_session_limits(mut self, limits: SessionLimits) -> Self {
        self.sessions = Arc::new(SessionStore::with_limits(limits));
        self
    }
}

/// How often idle sessions are swept
const SESSION_SWEEP_PERIOD: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the HTTP router
pub fn router(state: AppState) -> Router {
    let session_routes = Router::new()
        .route("/", get(handlers::index))
        .route("/api/analyze", post(handlers::analyze))
        .route(
            "/api/session",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route(
            "/api/credential",
            put(handlers::put_credential).delete(handlers::delete_credential),
        )
        .route("/api/summary/:owner/:name", get(handlers::stream_summary))
        .route(
            "/api/comparison",
            get(handlers::list_comparison)
                .post(handlers::add_to_comparison)
                .delete(handlers::clear_comparison),
        )
        .route(
            "/api/comparison/:id",
            delete(handlers::remove_from_comparison),
        )
        .route(
            "/api/comparison/export/json",
            get(handlers::export_comparison_json),
        )
        .route(
            "/api/comparison/export/csv",
            get(handlers::export_comparison_csv),
        )
        .route("/api/export/json", get(handlers::export_json))
        .route("/api/export/csv", get(handlers::export_csv))
        .route("/api/search", get(handlers::search))
        .route("/api/trending", get(handlers::trending))
        // Deep link last; static `/api/...` segments take priority
        .route("/:owner/:name", get(handlers::deep_link))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            layers::session_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(session_routes)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers([HeaderName::from_static(layers::SESSION_HEADER)]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,repolens_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting RepoLens API...");

    // Load configuration
    let config = Config::from_env();
    if config.ai_api_token.is_empty() {
        tracing::warn!("AI_API_TOKEN is not set; README summaries will fail upstream");
    }

    // Create adapters
    let github: Arc<dyn GithubClient> = Arc::new(GithubClientImpl::new(config.readme_timeout)?);
    let completion: Arc<dyn CompletionClient> = Arc::new(OpenAiCompletionClient::new(
        config.ai_api_url.clone(),
        config.ai_api_token.clone(),
    ));

    let github_settings = GithubSettings {
        base_url: config.github_api_url.clone(),
        default_token: config.github_default_token.clone(),
    };
    let summary_settings = SummarySettings {
        model: config.ai_model.clone(),
        readme_timeout: config.readme_timeout,
        ..SummarySettings::default()
    };

    // Create app state
    let state = AppState::new(github, completion, github_settings, summary_settings)
        .with_session_limits(SessionLimits {
            idle_ttl: config.session_idle_ttl,
            max_sessions: config.max_sessions,
        });
    let _sweeper = state.sessions.clone().spawn_sweeper(SESSION_SWEEP_PERIOD);
    let app = router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
