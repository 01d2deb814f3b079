use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::{
        dto::{GoogleLoginRequest, LoginResponse, ProfileResponse},
        extractors::AuthUser,
        repo_types::User,
        services::login_with_google,
    },
    error::{json_body, AppError, AppResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/google", post(google_login))
}

/// Routes that sit behind the session token middleware.
pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/auth/profile", get(get_profile))
}

#[instrument(skip(state, payload))]
pub async fn google_login(
    State(state): State<AppState>,
    payload: Result<Json<GoogleLoginRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let credential = json_body(payload)?
        .credential
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| {
            warn!("login without credential");
            AppError::BadRequest("Google credential required".into())
        })?;

    let (user, token) = login_with_google(&state, credential.trim()).await?;

    Ok(Json(LoginResponse {
        success: true,
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state, claims), fields(user_id = claims.id))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> AppResult<Json<ProfileResponse>> {
    let user = User::find_by_id(&state.db, claims.id)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    Ok(Json(ProfileResponse { user: user.into() }))
}
