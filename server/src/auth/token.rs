//! HS256 bearer tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use pawsync_engine::OwnerId;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Claims carried by a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Owner identity
    pub sub: String,
    /// Expiry, seconds since the epoch
    pub exp: i64,
}

/// Mint a token for `owner` valid for `ttl`.
pub fn issue_token(
    secret: &str,
    owner: &str,
    ttl: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: owner.to_string(),
        exp: (Utc::now() + ttl).timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify a token and return the owner it was issued for.
pub fn verify_token(secret: &str, token: &str) -> Result<OwnerId, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp", "sub"]);

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| AppError::unauthorized(format!("Token validation failed: {e}")))?;

    let owner = decoded.claims.sub.trim();
    if owner.is_empty() {
        return Err(AppError::unauthorized("Token subject is missing"));
    }
    if owner.contains('\0') {
        return Err(AppError::unauthorized("Token subject is malformed"));
    }
    Ok(owner.to_string())
}
