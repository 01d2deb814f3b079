use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use super::{claims::SessionClaims, repo_types::User};
use crate::{error::AppError, state::AppState};

/// Claims attached by [`require_auth`](super::middleware::require_auth).
pub struct AuthUser(pub SessionClaims);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionClaims>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::MissingToken)
    }
}

/// Authenticated caller with the administrator flag as currently stored.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub id: i64,
    pub is_admin: bool,
}

#[async_trait]
impl FromRequestParts<AppState> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;

        let Some(is_admin) = User::admin_flag(&state.db, claims.id).await? else {
            warn!(user_id = claims.id, "token for unknown user");
            return Err(AppError::UnknownUser);
        };

        Ok(Viewer {
            id: claims.id,
            is_admin,
        })
    }
}
