//! Profile API Endpoints
//! Mission: Expose profile CRUD, experience/education lists and the GitHub proxy

use crate::app::AppState;
use crate::auth::AuthUser;
use crate::error::{ApiError, FieldError, ProfileError};
use crate::profile::models::{EducationRequest, ExperienceRequest, ProfileRequest, ProfileView};
use crate::validation::{is_valid_github_username, Checks};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

/// Current user's profile - GET /api/profile/me
pub async fn get_my_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProfileView>, ApiError> {
    let profile = state
        .profiles
        .find_by_user(&user.id)
        .await
        .map_err(ProfileError::from)?
        .ok_or(ProfileError::NoProfile)?;

    Ok(Json(profile))
}

/// Create or update profile - POST /api/profile
pub async fn upsert_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ProfileRequest>,
) -> Result<Json<ProfileView>, ApiError> {
    let mut checks = Checks::new().required("status", &payload.status, "Status is required");
    if payload.skills.to_list().is_empty() {
        checks = checks.required("skills", "", "Skills is required");
    }
    checks.finish()?;

    let profile = state.profiles.upsert(&user.id, &payload).await?;

    Ok(Json(profile))
}

/// All profiles - GET /api/profile
pub async fn list_profiles(State(state): State<AppState>) -> Result<Json<Vec<ProfileView>>, ApiError> {
    let profiles = state.profiles.list().await.map_err(ProfileError::from)?;
    Ok(Json(profiles))
}

/// Profile by user id - GET /api/profile/user/:user_id
pub async fn get_profile_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileView>, ApiError> {
    // A malformed id can never match, so it reads the same as an unknown one
    let user_id = Uuid::parse_str(&user_id).map_err(|_| ProfileError::ProfileNotFound)?;

    let profile = state
        .profiles
        .find_by_user(&user_id)
        .await
        .map_err(ProfileError::from)?
        .ok_or(ProfileError::ProfileNotFound)?;

    Ok(Json(profile))
}

/// Delete own profile and account - DELETE /api/profile
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    // Profile row goes with the user through ON DELETE CASCADE
    state.credentials.remove(&user.id).await?;

    info!("🗑️  Account closed: {}", user.id);

    Ok(Json(json!({ "msg": "User deleted" })))
}

/// Add experience - PUT /api/profile/experience
pub async fn add_experience(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ExperienceRequest>,
) -> Result<Json<ProfileView>, ApiError> {
    Checks::new()
        .required("title", &payload.title, "Title is required")
        .required("company", &payload.company, "Company is required")
        .required("from", &payload.from, "From date is required")
        .finish()?;

    let profile = state
        .profiles
        .add_experience(&user.id, payload.into_entry())
        .await?;

    Ok(Json(profile))
}

/// Delete experience - DELETE /api/profile/experience/:exp_id
pub async fn delete_experience(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(exp_id): Path<String>,
) -> Result<Json<ProfileView>, ApiError> {
    let profile = state.profiles.remove_experience(&user.id, &exp_id).await?;
    Ok(Json(profile))
}

/// Add education - PUT /api/profile/education
pub async fn add_education(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<EducationRequest>,
) -> Result<Json<ProfileView>, ApiError> {
    Checks::new()
        .required("school", &payload.school, "School is required")
        .required("degree", &payload.degree, "Degree is required")
        .required("fieldofstudy", &payload.fieldofstudy, "Field of study is required")
        .required("from", &payload.from, "From date is required")
        .finish()?;

    let profile = state
        .profiles
        .add_education(&user.id, payload.into_entry())
        .await?;

    Ok(Json(profile))
}

/// Delete education - DELETE /api/profile/education/:edu_id
pub async fn delete_education(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(edu_id): Path<String>,
) -> Result<Json<ProfileView>, ApiError> {
    let profile = state.profiles.remove_education(&user.id, &edu_id).await?;
    Ok(Json(profile))
}

/// GitHub repos - GET /api/profile/github/:username
pub async fn github_repos(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !is_valid_github_username(&username) {
        return Err(ApiError::Validation(vec![FieldError::new(
            "username",
            "Invalid GitHub username",
        )]));
    }

    let repos = state.github.latest_repos(&username).await?;
    Ok(Json(repos))
}
