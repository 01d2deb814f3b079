use axum::extract::FromRef;
use tracing::{error, info, warn};

use crate::{
    auth::{google::GoogleIdentity, jwt::SessionKeys, repo_types::User},
    error::{AppError, AppResult},
    state::AppState,
};

/// Exact-match allow-list check for the administrator flag.
pub fn is_admin_email(admin_email: &str, email: &str) -> bool {
    !admin_email.is_empty() && email == admin_email
}

/// Create or refresh the local user for a verified identity.
pub async fn resolve_user(state: &AppState, identity: &GoogleIdentity) -> AppResult<User> {
    let is_admin = is_admin_email(&state.config.admin_email, &identity.email);
    let row = User::upsert_from_identity(&state.db, identity, is_admin)
        .await
        .map_err(|e| {
            error!(error = %e, google_id = %identity.google_id, "user upsert failed");
            AppError::AuthenticationFailed(e.to_string())
        })?;

    if row.inserted {
        info!(user_id = row.user.id, email = %row.user.email, is_admin, "new user created");
    } else {
        info!(user_id = row.user.id, email = %row.user.email, is_admin, "user logged in");
    }
    Ok(row.user)
}

/// Google credential → local user → session token.
pub async fn login_with_google(state: &AppState, credential: &str) -> AppResult<(User, String)> {
    let identity = state.verifier.verify(credential).await.map_err(|e| {
        warn!(error = %e, "google token verification failed");
        AppError::AuthenticationFailed(e.to_string())
    })?;

    let user = resolve_user(state, &identity).await?;

    let token = SessionKeys::from_ref(state).issue(&user).map_err(|e| {
        error!(error = %e, user_id = user.id, "session token signing failed");
        AppError::AuthenticationFailed(e.to_string())
    })?;
    Ok((user, token))
}
