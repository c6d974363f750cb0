//! Error types for devhub-backend
//!
//! Domain errors are `thiserror` enums returned as values from the stores and
//! the token service. `ApiError` is the single HTTP-facing type; handlers and
//! the auth gate convert into it and it decides status code and body shape.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors raised by the authentication core
#[derive(Debug, Error)]
pub enum AuthError {
    /// Registration with an email that is already stored
    #[error("User already exists")]
    DuplicateEmail,

    /// Unknown email or wrong password (deliberately indistinguishable)
    #[error("Invalid Credentials")]
    InvalidCredentials,

    /// No user with the requested id
    #[error("User not found")]
    NotFound,

    /// No token presented
    #[error("No token, authorization denied")]
    MissingToken,

    /// Bad signature, malformed payload, or expired
    #[error("Token is not valid")]
    InvalidToken,

    /// Signing or hashing could not run (secret or cost misconfigured)
    #[error("Fatal auth error: {0}")]
    Fatal(String),

    /// Persistence backend failure
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Errors raised by profile operations and the GitHub proxy
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("There is no profile for this user")]
    NoProfile,

    #[error("Profile not found")]
    ProfileNotFound,

    /// Owner of a still-valid token no longer exists
    #[error("User not found")]
    UserNotFound,

    #[error("Experience not found")]
    ExperienceNotFound,

    #[error("Education not found")]
    EducationNotFound,

    #[error("No Github profile found")]
    GithubNotFound,

    #[error("GitHub request failed: {0}")]
    Upstream(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// One failed input check, reported as `{"msg": .., "param": ..}`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub msg: String,
    pub param: String,
}

impl FieldError {
    pub fn new(param: &str, msg: &str) -> Self {
        Self {
            msg: msg.to_string(),
            param: param.to_string(),
        }
    }
}

/// HTTP-facing error
#[derive(Debug)]
pub enum ApiError {
    Validation(Vec<FieldError>),
    Auth(AuthError),
    Profile(ProfileError),
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::Auth(e)
    }
}

impl From<ProfileError> for ApiError {
    fn from(e: ProfileError) -> Self {
        ApiError::Profile(e)
    }
}

fn errors_body(msg: &str) -> serde_json::Value {
    json!({ "errors": [{ "msg": msg }] })
}

fn msg_body(msg: &str) -> serde_json::Value {
    json!({ "msg": msg })
}

fn server_error() -> (StatusCode, serde_json::Value) {
    (StatusCode::INTERNAL_SERVER_ERROR, msg_body("Server Error"))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, json!({ "errors": errors }))
            }
            ApiError::Auth(e) => match e {
                AuthError::DuplicateEmail | AuthError::InvalidCredentials => {
                    (StatusCode::BAD_REQUEST, errors_body(&e.to_string()))
                }
                AuthError::NotFound => (StatusCode::BAD_REQUEST, msg_body(&e.to_string())),
                AuthError::MissingToken | AuthError::InvalidToken => {
                    (StatusCode::UNAUTHORIZED, msg_body(&e.to_string()))
                }
                AuthError::Fatal(_) | AuthError::Storage(_) => {
                    error!("❌ Auth request aborted: {}", e);
                    server_error()
                }
            },
            ApiError::Profile(e) => match e {
                ProfileError::Upstream(_) | ProfileError::Storage(_) => {
                    error!("❌ Profile request aborted: {}", e);
                    server_error()
                }
                _ => (StatusCode::BAD_REQUEST, msg_body(&e.to_string())),
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_statuses() {
        let missing = ApiError::from(AuthError::MissingToken).into_response();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let invalid = ApiError::from(AuthError::InvalidToken).into_response();
        assert_eq!(invalid.status(), StatusCode::UNAUTHORIZED);

        let dup = ApiError::from(AuthError::DuplicateEmail).into_response();
        assert_eq!(dup.status(), StatusCode::BAD_REQUEST);

        let creds = ApiError::from(AuthError::InvalidCredentials).into_response();
        assert_eq!(creds.status(), StatusCode::BAD_REQUEST);

        let fatal = ApiError::from(AuthError::Fatal("no secret".into())).into_response();
        assert_eq!(fatal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_missing_and_invalid_messages_differ() {
        assert_ne!(
            AuthError::MissingToken.to_string(),
            AuthError::InvalidToken.to_string()
        );
    }

    #[test]
    fn test_profile_error_statuses() {
        let none = ApiError::from(ProfileError::NoProfile).into_response();
        assert_eq!(none.status(), StatusCode::BAD_REQUEST);

        let gone = ApiError::from(ProfileError::UserNotFound).into_response();
        assert_eq!(gone.status(), StatusCode::BAD_REQUEST);

        let gh = ApiError::from(ProfileError::GithubNotFound).into_response();
        assert_eq!(gh.status(), StatusCode::BAD_REQUEST);

        let upstream = ApiError::from(ProfileError::Upstream("timeout".into())).into_response();
        assert_eq!(upstream.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_error_status() {
        let resp = ApiError::Validation(vec![FieldError::new("email", "bad")]).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
