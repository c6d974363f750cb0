//! GitHub Repository Proxy
//! Mission: Fetch a user's latest public repositories for their profile page

use crate::config::GithubConfig;
use crate::error::ProfileError;
use anyhow::{Context, Result};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = "devhub-backend";

pub struct GithubClient {
    http: reqwest::Client,
    config: GithubConfig,
}

impl GithubClient {
    pub fn new(config: GithubConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::with_client(http, config))
    }

    pub fn with_client(http: reqwest::Client, config: GithubConfig) -> Self {
        Self { http, config }
    }

    /// Five most recently created repositories of `username`, as GitHub returns them
    pub async fn latest_repos(&self, username: &str) -> Result<serde_json::Value, ProfileError> {
        let url = format!("{}/users/{}/repos", self.config.api_url, username);

        let mut query: Vec<(&str, &str)> = vec![("per_page", "5"), ("sort", "created:asc")];
        if let (Some(id), Some(secret)) = (&self.config.client_id, &self.config.client_secret) {
            query.push(("client_id", id.as_str()));
            query.push(("client_secret", secret.as_str()));
        }

        debug!("Fetching GitHub repos for {}", username);

        let resp = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| ProfileError::Upstream(e.to_string()))?;

        if resp.status() != StatusCode::OK {
            warn!(
                "GitHub lookup for {} returned {}",
                username,
                resp.status().as_u16()
            );
            return Err(ProfileError::GithubNotFound);
        }

        resp.json::<serde_json::Value>()
            .await
            .map_err(|e| ProfileError::Upstream(e.to_string()))
    }
}
