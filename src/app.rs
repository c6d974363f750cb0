//! Application Wiring
//! Mission: Assemble shared state and the HTTP router

use crate::auth::{api as auth_api, auth_middleware, CredentialStore, SqliteUserBackend, TokenService};
use crate::config::Config;
use crate::db::Database;
use crate::middleware::request_logging;
use crate::profile::{api as profile_api, GithubClient, ProfileStore};
use anyhow::{Context, Result};
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialStore>,
    pub tokens: Arc<TokenService>,
    pub profiles: Arc<ProfileStore>,
    pub github: Arc<GithubClient>,
}

impl AppState {
    /// Build every service from configuration over an opened database
    pub fn from_config(config: &Config, db: Database) -> Result<Self> {
        let backend = Arc::new(SqliteUserBackend::new(db.clone()));
        let credentials = CredentialStore::new(backend, config.bcrypt_cost)
            .context("Failed to initialize credential store")?;
        let tokens = TokenService::new(&config.jwt_secret, config.token_ttl)
            .context("Failed to initialize token service")?;
        let github = GithubClient::new(config.github.clone())?;

        Ok(Self {
            credentials: Arc::new(credentials),
            tokens: Arc::new(tokens),
            profiles: Arc::new(ProfileStore::new(db)),
            github: Arc::new(github),
        })
    }
}

/// Full router: public, auth and token-protected routes
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/users", post(auth_api::register))
        .route("/api/auth", post(auth_api::login))
        .route("/api/profile", get(profile_api::list_profiles))
        .route(
            "/api/profile/user/:user_id",
            get(profile_api::get_profile_by_user),
        );

    let protected_routes = Router::new()
        .route("/api/auth", get(auth_api::get_current_user))
        .route("/api/profile/me", get(profile_api::get_my_profile))
        .route(
            "/api/profile",
            post(profile_api::upsert_profile).delete(profile_api::delete_account),
        )
        .route("/api/profile/experience", put(profile_api::add_experience))
        .route(
            "/api/profile/experience/:exp_id",
            delete(profile_api::delete_experience),
        )
        .route("/api/profile/education", put(profile_api::add_education))
        .route(
            "/api/profile/education/:edu_id",
            delete(profile_api::delete_education),
        )
        .route(
            "/api/profile/github/:username",
            get(profile_api::github_repos),
        )
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
}

async fn root() -> &'static str {
    "API Started!"
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
