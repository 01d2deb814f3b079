use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,                     // generated user ID
    #[serde(skip_serializing)]
    pub google_id: String,           // external identity (`sub`), immutable
    pub email: String,               // unique email
    pub name: String,                // display name
    pub picture: Option<String>,     // avatar URL
    pub is_admin: bool,              // recomputed on every login
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Row returned by the login upsert.
#[derive(Debug, FromRow)]
pub struct UpsertedUser {
    #[sqlx(flatten)]
    pub user: User,
    pub inserted: bool,
}
