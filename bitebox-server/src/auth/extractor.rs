//! Bearer token extractor
//!
//! Handlers take [`CurrentUser`] as an argument to require authentication,
//! and [`StaffUser`] to require the staff role.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::AppError;

use super::{CurrentUser, JwtError, JwtService};
use crate::state::AppState;

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let token = match header {
            Some(h) => JwtService::extract_from_header(h)
                .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
            None => {
                tracing::debug!(uri = %parts.uri, "Missing bearer token");
                return Err(AppError::not_authenticated());
            }
        };

        let claims = state.jwt.validate_token(token).map_err(|e| {
            tracing::warn!(error = %e, uri = %parts.uri, "Bearer token rejected");
            match e {
                JwtError::ExpiredToken => AppError::token_expired(),
                _ => AppError::invalid_token("Invalid token"),
            }
        })?;

        let user = CurrentUser::try_from(claims)
            .map_err(|e| AppError::invalid_token(format!("Malformed token claims: {e}")))?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// An authenticated caller holding the staff role
#[derive(Debug, Clone)]
pub struct StaffUser(pub CurrentUser);

impl FromRequestParts<AppState> for StaffUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_staff() {
            tracing::warn!(user_id = %user.id, uri = %parts.uri, "Staff route denied");
            return Err(AppError::staff_required());
        }
        Ok(StaffUser(user))
    }
}
