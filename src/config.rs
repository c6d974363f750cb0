//! Runtime Configuration
//! Mission: Read environment once at startup and hand out an immutable view

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;
use tracing::warn;

/// Default token lifetime in seconds (100 hours).
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 360_000;

const DEV_JWT_SECRET: &str = "dev-secret-change-in-production-minimum-32-characters";

/// Application configuration, built once in `main` and shared read-only
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    pub db_path: String,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub bcrypt_cost: u32,
    pub github: GithubConfig,
}

/// Credentials and endpoint for the GitHub repository proxy
#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub api_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            client_id: None,
            client_secret: None,
        }
    }
}

impl Config {
    /// Build configuration from process environment (after `dotenv` has run)
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .context("Invalid PORT")?;

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ => {
                warn!("⚠️  JWT_SECRET not set, using development secret. CHANGE IN PRODUCTION!");
                DEV_JWT_SECRET.to_string()
            }
        };

        let token_ttl_secs = env::var("TOKEN_TTL_SECS")
            .ok()
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("Invalid TOKEN_TTL_SECS")?
            .filter(|&v| v > 0)
            .unwrap_or(DEFAULT_TOKEN_TTL_SECS);

        let bcrypt_cost = env::var("BCRYPT_COST")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|c| (4..=31).contains(c))
            .unwrap_or(bcrypt::DEFAULT_COST);

        let github = GithubConfig {
            api_url: env::var("GITHUB_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| GithubConfig::default().api_url),
            client_id: non_empty_var("GITHUB_CLIENT_ID"),
            client_secret: non_empty_var("GITHUB_SECRET"),
        };

        Ok(Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            db_path: env::var("DB_PATH").unwrap_or_else(|_| "devhub.db".to_string()),
            jwt_secret,
            token_ttl: Duration::from_secs(token_ttl_secs),
            bcrypt_cost,
            github,
        })
    }

    /// Socket address string for the listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
