//! Session token middleware for protected routes.

use axum::{
    extract::{FromRef, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use super::jwt::SessionKeys;
use crate::{error::AppError, state::AppState};

/// Validates `Authorization: Bearer <token>` and stores the claims in request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(request.headers()) else {
        debug!(path = %request.uri().path(), "no access token");
        return Err(AppError::MissingToken);
    };

    let claims = SessionKeys::from_ref(&state).verify(token).map_err(|e| {
        warn!(error = %e, path = %request.uri().path(), "session token refused");
        AppError::from(e)
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
