use crate::state::AppState;
use axum::Router;

mod claims;
pub mod dto;
pub mod extractors;
pub mod google;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use claims::SessionClaims;

/// Sign-in routes; no session token required.
pub fn public_router() -> Router<AppState> {
    handlers::auth_routes()
}

/// Routes that require a session token.
pub fn router() -> Router<AppState> {
    handlers::profile_routes()
}
