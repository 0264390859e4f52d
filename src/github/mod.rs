// External repository lookup: proxies the five most recently created repos
// for a username from the configured hosting API.
use serde_json::Value;
use thiserror::Error;

use crate::config::GithubConfig;
use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum GithubError {
    #[error("upstream returned status {0}")]
    UpstreamStatus(u16),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl From<GithubError> for ApiError {
    fn from(err: GithubError) -> Self {
        match err {
            // Any non-200 upstream response collapses to the same envelope
            GithubError::UpstreamStatus(_) => ApiError::not_found("No github profile found"),
            GithubError::Transport(e) => {
                tracing::error!("github request failed: {}", e);
                ApiError::server_error()
            }
        }
    }
}

/// Client for the repository-hosting API, built once at startup and carried
/// in application state. No retry or timeout; a failed lookup is surfaced
/// directly to the caller.
#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    client_id: String,
    client_secret: String,
}

impl GithubClient {
    pub fn new(config: &GithubConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }

    /// Five most recently created repositories for the account, passed
    /// through verbatim on success.
    pub async fn recent_repos(&self, username: &str) -> Result<Value, GithubError> {
        let url = format!("{}/users/{}/repos", self.api_base, username);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("per_page", "5"),
                ("sort", "created:asc"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .header(reqwest::header::USER_AGENT, "devconnector-api")
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(GithubError::UpstreamStatus(response.status().as_u16()));
        }

        Ok(response.json::<Value>().await?)
    }
}
