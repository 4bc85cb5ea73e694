//! Authentication middleware
//!
//! Verifies the bearer token and resolves the caller identity from its claims.

use crate::auth::Caller;
use crate::error::AppError;
use crate::models::is_valid_identity;
use crate::state::SharedState;
use crate::voting::Identity;
use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Extract the caller from the request
pub async fn caller_middleware(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization format".to_string()))?;

    let claims = state.tokens.decode(token.trim())?;

    if !is_valid_identity(&claims.sub) {
        return Err(AppError::Unauthorized(
            "Token subject is not a valid identity".to_string(),
        ));
    }

    // Insert caller into request extensions for handlers to use
    request.extensions_mut().insert(Caller(Identity::new(claims.sub)));

    Ok(next.run(request).await)
}
