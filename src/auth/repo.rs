use crate::auth::{
    google::GoogleIdentity,
    repo_types::{UpsertedUser, User},
};
use sqlx::PgPool;

impl User {
    /// Insert or refresh the user keyed by `google_id` in one statement.
    ///
    /// Concurrent first logins for the same identity collapse onto the unique
    /// constraint; the loser takes the update branch. The email is only written
    /// on insert. `inserted` reports which branch ran.
    pub async fn upsert_from_identity(
        db: &PgPool,
        identity: &GoogleIdentity,
        is_admin: bool,
    ) -> anyhow::Result<UpsertedUser> {
        let row = sqlx::query_as::<_, UpsertedUser>(
            r#"
            INSERT INTO users (google_id, email, name, picture, is_admin)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (google_id) DO UPDATE
               SET name = EXCLUDED.name,
                   picture = EXCLUDED.picture,
                   is_admin = EXCLUDED.is_admin,
                   updated_at = NOW()
            RETURNING id, google_id, email, name, picture, is_admin, created_at, updated_at,
                      (xmax = 0) AS inserted
            "#,
        )
        .bind(&identity.google_id)
        .bind(&identity.email)
        .bind(&identity.name)
        .bind(&identity.picture)
        .bind(is_admin)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    /// Find a user by id.
    pub async fn find_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, google_id, email, name, picture, is_admin, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Current administrator flag, `None` when the user no longer exists.
    pub async fn admin_flag(db: &PgPool, id: i64) -> anyhow::Result<Option<bool>> {
        let flag = sqlx::query_scalar::<_, bool>(r#"SELECT is_admin FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(flag)
    }
}
