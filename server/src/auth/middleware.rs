//! Authentication extractor.
//!
//! Requires `Authorization: Bearer <token>` and resolves the token's subject
//! into the principal that scopes every store access of the request.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use pawsync_engine::OwnerId;

use super::token::verify_token;
use crate::error::AppError;
use crate::AppState;

/// Authenticated user extracted from request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The principal all core operations are scoped to
    pub owner_id: OwnerId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?
            .to_str()
            .map_err(|_| AppError::unauthorized("Authorization header is not valid UTF-8"))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))?;

        let owner_id = verify_token(&state.config.auth_secret, token)?;
        tracing::debug!(owner = %owner_id, "Authenticated request");

        Ok(AuthUser { owner_id })
    }
}
