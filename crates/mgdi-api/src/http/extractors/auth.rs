//! API key authentication extractor.
//!
//! Reads the key from `Authorization: Bearer <key>` or `X-API-Key: <key>`
//! and resolves it to a verified [`Principal`]. Memory routes take the
//! principal's user id from here and nowhere else.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use mgdi_core::auth::PrincipalVerifier;
use mgdi_types::error::AuthError;
use mgdi_types::identity::Principal;

use crate::http::error::AppError;
use crate::state::AppState;

/// The verified caller. Extracting this validates the API key.
pub struct Authenticated(pub Principal);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let api_key = extract_api_key(parts)?;
        let principal = state.api_keys.verify(&api_key).await?;
        Ok(Authenticated(principal))
    }
}

/// Extract the API key from request headers.
fn extract_api_key(parts: &Parts) -> Result<String, AppError> {
    if let Some(auth) = parts.headers.get("authorization") {
        let auth_str = auth.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid Authorization header encoding".to_string())
        })?;
        if let Some(key) = auth_str.strip_prefix("Bearer ") {
            return Ok(key.trim().to_string());
        }
    }

    if let Some(key) = parts.headers.get("x-api-key") {
        let key_str = key.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid X-API-Key header encoding".to_string())
        })?;
        return Ok(key_str.trim().to_string());
    }

    Err(AuthError::MissingCredentials.into())
}
