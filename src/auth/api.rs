//! Authentication API Endpoints
//! Mission: Provide registration, login and current-user endpoints

use crate::app::AppState;
use crate::auth::models::{AuthUser, LoginRequest, RegisterRequest, TokenResponse, UserPublicView};
use crate::error::ApiError;
use crate::validation::{Checks, MIN_PASSWORD_LEN};
use axum::{extract::State, Extension, Json};
use tracing::info;

/// Register endpoint - POST /api/users
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    Checks::new()
        .required("name", &payload.name, "Name is required")
        .email("email", &payload.email, "Please include a valid email")
        .min_len(
            "password",
            &payload.password,
            MIN_PASSWORD_LEN,
            "Please enter a password with 6 or more characters",
        )
        .finish()?;

    info!("📝 Registration attempt: {}", payload.email);

    let user_id = state
        .credentials
        .register(&payload.name, &payload.email, &payload.password)
        .await?;

    let token = state.tokens.issue(&user_id)?;

    Ok(Json(TokenResponse { token }))
}

/// Login endpoint - POST /api/auth
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    Checks::new()
        .email("email", &payload.email, "Please include a valid email")
        .required("password", &payload.password, "Password is required")
        .finish()?;

    info!("🔐 Login attempt: {}", payload.email);

    let user_id = state
        .credentials
        .verify_password(&payload.email, &payload.password)
        .await?;

    let token = state.tokens.issue(&user_id)?;

    info!("✅ Login successful: {}", payload.email);

    Ok(Json(TokenResponse { token }))
}

/// Get current user info - GET /api/auth
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserPublicView>, ApiError> {
    let view = state.credentials.get_by_id(&user.id).await?;
    Ok(Json(view))
}
