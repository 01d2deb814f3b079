use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::repo_types::User;

/// Request body for Google sign-in.
#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    #[serde(default)]
    pub credential: Option<String>,
}

/// Response returned after a successful sign-in.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: PublicUser,
}

/// Public part of the user returned at login.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub is_admin: bool,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            picture: u.picture,
            is_admin: u.is_admin,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: Profile,
}

#[derive(Debug, Serialize)]
pub struct Profile {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for Profile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            picture: u.picture,
            created_at: u.created_at,
        }
    }
}
