//! Authentication Middleware
//! Mission: Guard protected routes with `x-auth-token` validation

use crate::auth::{jwt::TokenService, models::AuthUser};
use crate::error::{ApiError, AuthError};
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Header carrying the bearer token
pub const AUTH_HEADER: &str = "x-auth-token";

/// Auth middleware that validates the token and attaches the caller's id
pub async fn auth_middleware(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = token_from_headers(req.headers())?;

    // InvalidToken for anything that fails to verify
    let user_id = tokens.verify(token)?;

    // Handlers read this via `Extension<AuthUser>`
    req.extensions_mut().insert(AuthUser { id: user_id });

    Ok(next.run(req).await)
}

/// Absent or blank header is `MissingToken`; a header that is not text is `InvalidToken`
fn token_from_headers(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers.get(AUTH_HEADER).ok_or(AuthError::MissingToken)?;
    let token = value.to_str().map_err(|_| AuthError::InvalidToken)?.trim();

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}
