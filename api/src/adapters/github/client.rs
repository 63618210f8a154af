//! GitHub API client implementation

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder};
use serde::Deserialize;
use urlencoding::encode;

use crate::domain::entities::RepositoryKey;
use crate::domain::ports::{
    languages_from_histogram, ActivityEvent, Contributor, GithubClient, GithubConfig, Language,
    Repository,
};
use crate::error::GithubError;

const ACCEPT_JSON: &str = "application/vnd.github.v3+json";
const ACCEPT_RAW: &str = "application/vnd.github.v3.raw";
const USER_AGENT: &str = concat!("repolens/", env!("CARGO_PKG_VERSION"));

/// Page size for the public events endpoint
const EVENTS_PAGE_SIZE: u32 = 30;
/// Number of repositories returned by the trending query
const TRENDING_PAGE_SIZE: u32 = 3;

/// Implementation of the GitHub API client
pub struct GithubClientImpl {
    http: Client,
    readme_timeout: Duration,
}

/// GitHub error body
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Search endpoint envelope
#[derive(Deserialize)]
struct SearchResponse {
    items: Vec<Repository>,
}

impl GithubClientImpl {
    pub fn new(readme_timeout: Duration) -> Result<Self, GithubError> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            readme_timeout,
        })
    }

    fn repo_url(config: &GithubConfig, key: &RepositoryKey, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            config.base_url,
            encode(&key.owner),
            encode(&key.name),
            suffix
        )
    }

    fn get(&self, config: &GithubConfig, url: &str, accept: &'static str) -> RequestBuilder {
        let request = self.http.get(url).header(header::ACCEPT, accept);
        match &config.credential {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, GithubError> {
        request.send().await.map_err(transport_error)
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
        what: &str,
    ) -> Result<T, GithubError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| GithubError::Deserialization(e.to_string()))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(status_error(status.as_u16(), &body, what))
        }
    }
}

fn transport_error(e: reqwest::Error) -> GithubError {
    if e.is_timeout() {
        GithubError::Timeout
    } else {
        GithubError::Request(e)
    }
}

/// Map a non-success response to the error taxonomy.
///
/// GitHub reports exhausted quotas as 403 with a "rate limit" message.
fn status_error(status: u16, body: &str, what: &str) -> GithubError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.to_string());

    match status {
        403 if message.to_lowercase().contains("rate limit") => GithubError::RateLimited,
        429 => GithubError::RateLimited,
        404 => GithubError::NotFound(what.to_string()),
        _ => GithubError::Api { status, message },
    }
}

#[async_trait]
impl GithubClient for GithubClientImpl {
    async fn get_repository(
        &self,
        config: &GithubConfig,
        key: &RepositoryKey,
    ) -> Result<Repository, GithubError> {
        let url = Self::repo_url(config, key, "");
        tracing::debug!(repo = %key, "Fetching repository");
        let resp = self.send(self.get(config, &url, ACCEPT_JSON)).await?;
        self.handle_response(resp, &format!("Repository {}", key))
            .await
    }

    async fn get_languages(
        &self,
        config: &GithubConfig,
        key: &RepositoryKey,
    ) -> Result<Vec<Language>, GithubError> {
        let url = Self::repo_url(config, key, "/languages");
        tracing::debug!(repo = %key, "Fetching languages");
        let resp = self.send(self.get(config, &url, ACCEPT_JSON)).await?;
        let histogram: BTreeMap<String, u64> = self
            .handle_response(resp, &format!("Languages of {}", key))
            .await?;
        Ok(languages_from_histogram(histogram))
    }

    async fn get_contributors(
        &self,
        config: &GithubConfig,
        key: &RepositoryKey,
    ) -> Result<Vec<Contributor>, GithubError> {
        let url = Self::repo_url(config, key, "/contributors");
        tracing::debug!(repo = %key, "Fetching contributors");
        let resp = self.send(self.get(config, &url, ACCEPT_JSON)).await?;

        // Empty or very large repositories answer 204 with no body
        if resp.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }

        self.handle_response(resp, &format!("Contributors of {}", key))
            .await
    }

    async fn get_recent_activity(
        &self,
        config: &GithubConfig,
        key: &RepositoryKey,
    ) -> Result<Vec<ActivityEvent>, GithubError> {
        let url = Self::repo_url(
            config,
            key,
            &format!("/events?per_page={}", EVENTS_PAGE_SIZE),
        );
        tracing::debug!(repo = %key, "Fetching recent activity");
        let resp = self.send(self.get(config, &url, ACCEPT_JSON)).await?;
        self.handle_response(resp, &format!("Activity of {}", key))
            .await
    }

    async fn get_readme(
        &self,
        config: &GithubConfig,
        key: &RepositoryKey,
    ) -> Result<String, GithubError> {
        let url = Self::repo_url(config, key, "/readme");
        tracing::debug!(repo = %key, "Fetching README");
        let resp = self
            .send(
                self.get(config, &url, ACCEPT_RAW)
                    .timeout(self.readme_timeout),
            )
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_error(
                status.as_u16(),
                &body,
                &format!("README of {}", key),
            ));
        }

        resp.text().await.map_err(transport_error)
    }

    async fn search_repositories(
        &self,
        config: &GithubConfig,
        query: &str,
    ) -> Result<Vec<Repository>, GithubError> {
        let url = format!(
            "{}/search/repositories?q={}&sort=stars&order=desc",
            config.base_url,
            encode(query)
        );
        let resp = self.send(self.get(config, &url, ACCEPT_JSON)).await?;
        let found: SearchResponse = self.handle_response(resp, "Search results").await?;
        Ok(found.items)
    }

    async fn trending_repositories(
        &self,
        config: &GithubConfig,
        since: &str,
    ) -> Result<Vec<Repository>, GithubError> {
        let query = format!("created:>{} stars:>100", since);
        let url = format!(
            "{}/search/repositories?q={}&sort=stars&order=desc&per_page={}",
            config.base_url,
            encode(&query),
            TRENDING_PAGE_SIZE
        );
        let resp = self.send(self.get(config, &url, ACCEPT_JSON)).await?;
        let found: SearchResponse = self.handle_response(resp, "Trending repositories").await?;
        Ok(found.items)
    }
}
