use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    /// GitHub REST API base URL
    pub github_api_url: String,
    /// Token used when a session has not supplied its own
    pub github_default_token: Option<String>,
    /// Chat-completion service base URL
    pub ai_api_url: String,
    pub ai_api_token: String,
    pub ai_model: String,
    /// Upper bound on the README fetch
    pub readme_timeout: Duration,
    /// Sessions unused for this long are dropped
    pub session_idle_ttl: Duration,
    pub max_sessions: usize,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            github_api_url: lookup("GITHUB_API_URL")
                .unwrap_or_else(|| "https://api.github.com".to_string()),
            github_default_token: lookup("GITHUB_DEFAULT_TOKEN").filter(|t| !t.trim().is_empty()),
            ai_api_url: lookup("AI_API_URL").unwrap_or_else(|| "https://api.openai.com".to_string()),
            ai_api_token: lookup("AI_API_TOKEN").unwrap_or_default(),
            ai_model: lookup("AI_MODEL").unwrap_or_else(|| "gpt-4.1-mini".to_string()),
            readme_timeout: Duration::from_secs(
                lookup("README_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            session_idle_ttl: Duration::from_secs(
                lookup("SESSION_IDLE_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1800),
            ),
            max_sessions: lookup("MAX_SESSIONS")
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(10_000),
            port: lookup("PORT").and_then(|p| p.parse().ok()).unwrap_or(8080),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(|_| None);

        assert_eq!(config.github_api_url, "https://api.github.com");
        assert_eq!(config.github_default_token, None);
        assert_eq!(config.ai_model, "gpt-4.1-mini");
        assert_eq!(config.readme_timeout, Duration::from_secs(5));
        assert_eq!(config.session_idle_ttl, Duration::from_secs(1800));
        assert_eq!(config.max_sessions, 10_000);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn overrides_and_bad_numbers() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("GITHUB_DEFAULT_TOKEN", "  "),
            ("AI_MODEL", "local-model"),
            ("README_TIMEOUT_SECS", "12"),
            ("SESSION_IDLE_SECS", "60"),
            ("MAX_SESSIONS", "0"),
            ("PORT", "not-a-port"),
        ]);
        let config = Config::from_lookup(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.github_default_token, None);
        assert_eq!(config.ai_model, "local-model");
        assert_eq!(config.readme_timeout, Duration::from_secs(12));
        assert_eq!(config.session_idle_ttl, Duration::from_secs(60));
        assert_eq!(config.max_sessions, 10_000);
        assert_eq!(config.port, 8080);
    }
}
